pub mod dto;
pub mod filter;
pub mod images;
pub mod repository;
pub mod routes;
