pub mod config;
pub mod cronjobs;
pub mod database;
pub mod modules;
pub mod server;
pub mod services;
pub mod tracer;
pub mod utils;
