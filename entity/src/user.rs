use super::sea_orm_active_enums::UserRole;
use super::traits::QueryableByEmail;
use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// bcrypt cost used to hash user passwords
pub const PASSWORD_HASH_COST: u32 = 10;

/// Car the user is looking for, used to personalize the user experience
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CarPreferences {
    pub make: Option<String>,
    pub model: Option<String>,
    #[serde(rename = "type")]
    pub car_type: Option<String>,
    pub steering: Option<String>,
    pub year: Option<i32>,
    pub price_range: Option<String>,
    pub mileage: Option<String>,
    pub location: Option<String>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// id of the google account, only set for users that signed in with google
    #[sea_orm(unique)]
    pub google_id: Option<String>,

    #[sea_orm(unique)]
    pub email: String,

    /// bcrypt hash of the user password, users created with google
    /// oauth do not have a password until they set one.
    pub password: Option<String>,

    pub display_name: String,

    pub first_name: String,

    pub last_name: String,

    pub profile_photo: Option<String>,

    pub role: UserRole,

    pub phone_number: Option<String>,

    pub date_of_birth: Option<Date>,

    pub language: String,

    pub car_preferences: CarPreferences,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

impl QueryableByEmail for Entity {
    type Model = Model;

    async fn find_by_email(email: &str, db: &DatabaseConnection) -> Result<Option<Model>, DbErr> {
        Self::find().filter(Column::Email.eq(email)).one(db).await
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::session::Entity")]
    Session,
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    /// hashes the password whenever a new plain text one is set
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if let ActiveValue::Set(Some(plain_text_password)) = &self.password {
            let hashed = bcrypt::hash(plain_text_password, PASSWORD_HASH_COST)
                .map_err(|e| DbErr::Custom(format!("failed to hash password: {e}")))?;

            self.password = Set(Some(hashed));
        }

        let now: DateTimeWithTimeZone = chrono::Utc::now().into();

        if insert {
            if self.created_at.is_not_set() {
                self.created_at = Set(now);
            }

            if self.language.is_not_set() {
                self.language = Set(String::from("English"));
            }

            if self.car_preferences.is_not_set() {
                self.car_preferences = Set(CarPreferences::default());
            }
        }

        self.updated_at = Set(now);

        Ok(self)
    }
}
