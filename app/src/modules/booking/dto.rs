use entity::sea_orm_active_enums::BookingStatus;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingDto {
    #[validate(length(min = 1, max = 256))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1, max = 64))]
    pub phone: String,

    /// date of the test drive, eg: `2025-03-10`
    #[validate(length(min = 1, max = 32))]
    pub date: String,

    /// time of the test drive, eg: `14:30`
    #[validate(length(min = 1, max = 32))]
    pub time: String,

    #[validate(length(min = 1, max = 256))]
    pub car_model: String,

    #[validate(length(max = 2048))]
    pub notes: Option<String>,
}

#[derive(Deserialize, ToSchema, Validate)]
pub struct UpdateBookingStatusDto {
    pub status: BookingStatus,
}
