use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Deserialize, ToSchema, Validate)]
pub struct ChatDto {
    #[validate(length(max = 4096))]
    pub message: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct ChatReply {
    pub reply: String,
}
