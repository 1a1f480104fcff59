use chrono::{DateTime, FixedOffset};
use entity::chat_message;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageDto {
    pub receiver_id: i32,

    #[validate(length(min = 1, max = 4096))]
    pub message: String,
}

/// The chat between the request admin and a user
#[derive(Serialize, ToSchema, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub user_id: i32,
    pub user_name: String,
    pub user_email: String,
    #[schema(value_type = ChatMessage)]
    pub last_message: chat_message::Model,
    /// messages sent by the user the admin did not read yet
    pub unread_count: u64,
    pub timestamp: DateTime<FixedOffset>,
}
