use entity::{ai_prediction, car, sea_orm_active_enums::PredictionStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Deserialize, ToSchema, Validate)]
pub struct SmartSearchDto {
    /// free text query, eg: `electric SUV under 40000`
    #[validate(length(min = 1, max = 512))]
    pub query: String,
}

#[derive(Deserialize, Serialize, ToSchema, Debug, Default, Clone, PartialEq)]
pub struct NumberRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Filters extracted by the LLM from a smart search query
#[derive(Deserialize, Serialize, ToSchema, Debug, Default, Clone, PartialEq)]
pub struct SmartSearchFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<NumberRange>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<NumberRange>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub car_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel: Option<String>,

    /// only `max` is used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mileage: Option<NumberRange>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct SmartSearchResponse {
    pub success: bool,
    pub count: usize,
    pub filters: SmartSearchFilters,
    #[schema(value_type = Vec<Car>)]
    pub cars: Vec<car::Model>,
}

/// Specs of the car to estimate the price of, every field is optional
#[derive(Deserialize, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct PredictCarDto {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    #[serde(rename = "type")]
    pub car_type: Option<String>,
    pub fuel: Option<String>,
    pub mileage: Option<i64>,
    pub color: Option<String>,
    pub engine_size: Option<String>,
    pub engine_cylinders: Option<i32>,
    pub engine_horsepower: Option<i32>,
    pub transmission: Option<String>,
    pub drive_train: Option<String>,
    pub condition: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResponse {
    /// estimated price in USD, as returned by the model
    #[schema(value_type = Object)]
    pub predicted_price: Value,

    /// Excellent, Good, Fair or Poor
    #[schema(value_type = Object)]
    pub predicted_condition: Value,
}

#[derive(Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeImageDto {
    pub car_id: i32,

    #[validate(length(min = 1, max = 2048))]
    pub image_url: String,
}

#[derive(Deserialize, ToSchema, Validate)]
pub struct UpdatePredictionStatusDto {
    pub status: PredictionStatus,
}

/// Demand of a car model, computed from its sales and time on the market
#[derive(Serialize, ToSchema, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DemandAnalysis {
    /// `<brand> <model>`
    pub model: String,
    pub value: f64,
    pub confidence: f64,
    pub sales: u32,
    pub available: u32,
    pub days_on_market: i64,
}

/// A image analysis with the analyzed car and the values derived from its defects
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnalysis {
    #[serde(flatten)]
    pub prediction: ai_prediction::Model,

    #[schema(value_type = Option<Car>)]
    pub car: Option<car::Model>,

    pub predicted_value: f64,
    pub damage_score: f64,
}
