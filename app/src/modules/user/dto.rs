use chrono::NaiveDate;
use entity::{sea_orm_active_enums::UserRole, user::CarPreferences};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Deserialize, Validate, ToSchema)]
pub struct UpdateUserRoleDto {
    #[validate(email)]
    pub email: String,

    pub role: UserRole,
}

#[derive(Deserialize, Validate, ToSchema)]
pub struct UpdateUserPasswordDto {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1, max = 256))]
    pub password: String,
}

#[derive(Deserialize, Validate, ToSchema)]
pub struct DeleteUserDto {
    #[validate(email)]
    pub email: String,
}

/// Fields a user can change on their own profile, absent fields are left untouched
#[derive(Deserialize, Validate, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileDto {
    #[validate(length(min = 1, max = 128))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 128))]
    pub last_name: Option<String>,

    #[validate(length(min = 1, max = 256))]
    pub display_name: Option<String>,

    #[validate(length(max = 64))]
    pub phone_number: Option<String>,

    pub date_of_birth: Option<NaiveDate>,

    #[validate(length(min = 1, max = 64))]
    pub language: Option<String>,

    #[validate(url)]
    pub profile_photo: Option<String>,

    pub car_preferences: Option<CarPreferences>,
}
