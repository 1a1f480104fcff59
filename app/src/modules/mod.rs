pub mod admin_chat;
pub mod ai;
pub mod auth;
pub mod booking;
pub mod car;
pub mod chatbot;
pub mod common;
pub mod contact;
pub mod footer;
pub mod user;
