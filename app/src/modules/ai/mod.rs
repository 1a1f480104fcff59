pub mod dto;
pub mod routes;
pub mod scoring;
