use super::sea_orm_active_enums::{CarCondition, CarStatus, CarType, DriveTrain, Fuel, Transmission};
use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A image of a car, `exists` tells if the image was confirmed to be present
/// on the object store, placeholders and unverified catalog images have it set
/// to false.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CarImage {
    pub url: String,
    pub exists: bool,
}

/// Ordered list of car images, stored as a json column
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
#[serde(transparent)]
pub struct CarImages(pub Vec<CarImage>);

/// List of car features, eg: `["Sunroof", "Heated Seats"]`, stored as a json column
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
#[serde(transparent)]
pub struct CarFeatures(pub Vec<String>);

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, ToSchema)]
#[schema(as = Car)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "car")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub brand: String,
    pub model: String,
    pub year: i32,
    #[sea_orm(column_type = "Double")]
    pub price: f64,
    pub mileage: i32,
    #[serde(rename = "type")]
    pub car_type: Option<CarType>,
    pub fuel: Fuel,
    pub transmission: Transmission,
    pub drive_train: Option<DriveTrain>,
    pub status: CarStatus,
    pub condition: CarCondition,
    pub color: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub engine_size: Option<String>,
    pub engine_cylinders: Option<i32>,
    pub engine_horsepower: Option<i32>,
    #[sea_orm(column_type = "Double", nullable)]
    pub rating: Option<f64>,
    pub features: CarFeatures,
    pub images: CarImages,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ai_prediction::Entity")]
    AiPrediction,
}

impl Related<super::ai_prediction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AiPrediction.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let now: DateTimeWithTimeZone = chrono::Utc::now().into();

        if insert && self.created_at.is_not_set() {
            self.created_at = Set(now);
        }

        self.updated_at = Set(now);

        Ok(self)
    }
}
