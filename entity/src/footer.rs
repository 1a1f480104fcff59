use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

fn default_link() -> String {
    String::from("#")
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
pub struct SocialLinks {
    #[serde(default = "default_link")]
    pub twitter: String,
    #[serde(default = "default_link")]
    pub youtube: String,
    #[serde(default = "default_link")]
    pub facebook: String,
}

impl Default for SocialLinks {
    fn default() -> Self {
        SocialLinks {
            twitter: default_link(),
            youtube: default_link(),
            facebook: default_link(),
        }
    }
}

/// Site footer content, the most recently updated record is the one in use
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, ToSchema)]
#[schema(as = Footer)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "footer")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub company_name: String,
    pub social_links: SocialLinks,
    pub updated_at: DateTimeWithTimeZone,
}

pub const DEFAULT_COMPANY_NAME: &str = "Car Selling";

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
