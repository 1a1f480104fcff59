use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

/// A contact form submission, `fullName`, `email`, `topic` and `message` are required
#[derive(Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitMessageDto {
    #[validate(length(max = 256))]
    pub full_name: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(max = 64))]
    pub phone: Option<String>,

    #[validate(length(max = 256))]
    pub car_model: Option<String>,

    #[validate(length(max = 32))]
    pub preferred_date: Option<String>,

    #[validate(length(max = 256))]
    pub topic: Option<String>,

    #[validate(length(max = 8192))]
    pub message: Option<String>,
}
