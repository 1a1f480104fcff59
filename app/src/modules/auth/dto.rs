use chrono::NaiveDate;
use entity::{sea_orm_active_enums::UserRole, user::CarPreferences};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

// --- INPUT

/// every field is optional so a missing one can be reported with a single message
#[derive(Deserialize, Validate, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct SignUp {
    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(max = 256))]
    pub password: Option<String>,

    #[validate(length(max = 128))]
    pub first_name: Option<String>,

    #[validate(length(max = 128))]
    pub last_name: Option<String>,
}

#[derive(Deserialize, Validate, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct SignIn {
    pub email: Option<String>,

    pub password: Option<String>,
}

// --- OUTPUT

/// A user as exposed by the API, never contains the password hash
#[derive(Serialize, Deserialize, ToSchema, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i32,
    pub email: String,
    pub google_id: Option<String>,
    pub display_name: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_photo: Option<String>,
    pub role: UserRole,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub language: String,
    pub car_preferences: CarPreferences,
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
}

impl From<entity::user::Model> for UserDto {
    fn from(user: entity::user::Model) -> Self {
        Self {
            id: user.id,
            email: user.email,
            google_id: user.google_id,
            display_name: user.display_name,
            first_name: user.first_name,
            last_name: user.last_name,
            profile_photo: user.profile_photo,
            role: user.role,
            phone_number: user.phone_number,
            date_of_birth: user.date_of_birth,
            language: user.language,
            car_preferences: user.car_preferences,
            created_at: user.created_at,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct SignUpResponse {
    pub message: String,
    pub user: UserDto,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct SignInResponse {
    pub message: String,
    pub user: UserDto,
    /// JWT valid for one day, can be sent as a `Authorization: Bearer <token>` header
    pub token: String,
}
