use sea_orm::entity::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

/// A single chatbot turn
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, ToSchema)]
#[schema(as = ChatLog)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "chat_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// email of the user that sent the message or `anonymous`
    pub user: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    #[sea_orm(column_type = "Text")]
    pub response: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
