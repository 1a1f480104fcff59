use entity::footer::SocialLinks;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFooterDto {
    #[validate(length(min = 1, max = 256))]
    pub company_name: Option<String>,

    /// missing links default to `#`
    pub social_links: Option<SocialLinks>,
}
