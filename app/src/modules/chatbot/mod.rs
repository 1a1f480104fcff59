pub mod dto;
pub mod intent;
pub mod routes;
