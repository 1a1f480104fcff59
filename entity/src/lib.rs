pub mod prelude;

pub mod ai_prediction;
pub mod booking;
pub mod car;
pub mod chat_log;
pub mod chat_message;
pub mod footer;
pub mod message;
pub mod sea_orm_active_enums;
pub mod session;
pub mod traits;
pub mod user;
