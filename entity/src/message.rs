use sea_orm::entity::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

/// A contact form submission
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, ToSchema)]
#[schema(as = Message)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "message")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub car_model: Option<String>,
    pub preferred_date: Option<String>,
    pub topic: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
