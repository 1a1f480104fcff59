use super::sea_orm_active_enums::PredictionStatus;
use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum DefectType {
    Paint,
    Tire,
    Interior,
    Engine,
    Body,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum DefectSeverity {
    None,
    Minor,
    Moderate,
    Major,
}

impl DefectSeverity {
    /// weight of the severity on the damage score of a analysis
    pub fn factor(&self) -> f64 {
        match self {
            DefectSeverity::None => 0.0,
            DefectSeverity::Minor => 0.1,
            DefectSeverity::Moderate => 0.3,
            DefectSeverity::Major => 0.5,
        }
    }
}

/// A defect found on a car image
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Defect {
    #[serde(rename = "type")]
    pub defect_type: DefectType,
    pub severity: DefectSeverity,
    pub description: String,
    /// 0 to 100
    pub confidence: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
#[serde(transparent)]
pub struct Defects(pub Vec<Defect>);

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, ToSchema)]
#[schema(as = AiPrediction)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "ai_prediction")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub car_id: i32,
    /// `<brand> <model>` of the analyzed car
    pub model: String,
    pub confidence: i32,
    pub status: PredictionStatus,
    pub image_url: String,
    pub defects: Defects,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::car::Entity",
        from = "Column::CarId",
        to = "super::car::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Car,
}

impl Related<super::car::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Car.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
