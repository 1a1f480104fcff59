use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A response with a single human readable message
#[derive(Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl From<&str> for MessageResponse {
    fn from(v: &str) -> Self {
        MessageResponse {
            message: String::from(v),
        }
    }
}

/// A response for endpoints that delete many records at once
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletedCountResponse {
    pub message: String,
    pub deleted_count: u64,
}

#[derive(Deserialize, ToSchema, Clone, Copy, PartialEq, Eq, Debug, Default)]
#[serde(rename_all = "lowercase")]
pub enum AscOrDescOrder {
    #[default]
    Asc,
    Desc,
}

impl AscOrDescOrder {
    /// parses a sort order the lenient way, anything other than `asc` is descending
    pub fn parse_lenient(value: &str) -> Self {
        if value.eq_ignore_ascii_case("asc") {
            AscOrDescOrder::Asc
        } else {
            AscOrDescOrder::Desc
        }
    }
}

impl From<AscOrDescOrder> for sea_orm::Order {
    fn from(v: AscOrDescOrder) -> Self {
        match v {
            AscOrDescOrder::Asc => sea_orm::Order::Asc,
            AscOrDescOrder::Desc => sea_orm::Order::Desc,
        }
    }
}
