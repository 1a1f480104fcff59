pub use super::ai_prediction::Entity as AiPrediction;
pub use super::booking::Entity as Booking;
pub use super::car::Entity as Car;
pub use super::chat_log::Entity as ChatLog;
pub use super::chat_message::Entity as ChatMessage;
pub use super::footer::Entity as Footer;
pub use super::message::Entity as Message;
pub use super::session::Entity as Session;
pub use super::user::Entity as User;
