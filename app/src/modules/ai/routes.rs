use super::{
    dto::{
        AnalyzeImageDto, DemandAnalysis, ImageAnalysis, PredictCarDto, PredictionResponse,
        SmartSearchDto, SmartSearchFilters, SmartSearchResponse, UpdatePredictionStatusDto,
    },
    scoring::{self, CarDemandRow},
};
use crate::{
    database::error::DbError,
    modules::{
        auth::middleware::{require_user, RoleLayer},
        car::repository::find_car_or_404,
        common::{
            extractors::{DbConnection, ValidatedJson},
            responses::{not_found, SimpleError},
        },
    },
    server::controller::AppState,
    services::llm::LlmError,
};
use axum::{
    extract::{Path, State},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::Utc;
use entity::{
    ai_prediction::{self, Defects},
    car,
    sea_orm_active_enums::{CarStatus, PredictionStatus},
};
use http::StatusCode;
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde_json::{json, Value};

/// confidence reported for every image analysis
const IMAGE_ANALYSIS_CONFIDENCE: i32 = 95;

const SMART_SEARCH_SYSTEM_PROMPT: &str =
    "Convert car search queries into JSON filters. Only include fields that are explicitly mentioned in the query.";

const VALUATION_SYSTEM_PROMPT: &str =
    "You are a car valuation expert. Provide accurate price estimates and condition assessments based on car specifications.";

pub fn create_router(state: AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/cars/analyze-image", post(analyze_image))
        .route("/predictions/:id/status", patch(update_prediction_status))
        .route_layer(RoleLayer::admin());

    let user = Router::new()
        .route("/predictions", get(demand_predictions))
        .route("/image-analysis", get(image_analysis))
        .merge(admin)
        .route_layer(axum::middleware::from_fn_with_state(state, require_user));

    Router::new()
        .route("/smart-search", post(smart_search))
        .route("/cars/predict", post(predict_car))
        .merge(user)
}

/// json schema of the arguments of the `filterCars` function the LLM is forced to call
fn filter_cars_schema() -> Value {
    let range = |props: Value| json!({ "type": "object", "properties": props });

    json!({
        "type": "object",
        "properties": {
            "brand": { "type": "string" },
            "model": { "type": "string" },
            "year": range(json!({ "min": { "type": "number" }, "max": { "type": "number" } })),
            "price": range(json!({ "min": { "type": "number" }, "max": { "type": "number" } })),
            "type": { "type": "string" },
            "fuel": { "type": "string" },
            "mileage": range(json!({ "max": { "type": "number" } })),
            "condition": { "type": "string" },
        },
    })
}

/// case insensitive substring match on a text column
fn contains_ignore_case(column: car::Column, value: &str) -> sea_orm::sea_query::SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(format!("%{}%", value.to_lowercase()))
}

/// builds the condition of a smart search, only available cars are ever matched
pub fn smart_search_condition(filters: &SmartSearchFilters) -> Condition {
    let mut cond = Condition::all().add(car::Column::Status.eq(CarStatus::Available));

    let text_filters = [
        (car::Column::Brand, &filters.brand),
        (car::Column::Model, &filters.model),
        (car::Column::CarType, &filters.car_type),
        (car::Column::Fuel, &filters.fuel),
        (car::Column::Condition, &filters.condition),
    ];

    for (column, value) in text_filters {
        if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            cond = cond.add(contains_ignore_case(column, value));
        }
    }

    if let Some(year) = &filters.year {
        if let Some(min) = year.min.filter(|v| *v > 0.0) {
            cond = cond.add(car::Column::Year.gte(min));
        }
        if let Some(max) = year.max.filter(|v| *v > 0.0) {
            cond = cond.add(car::Column::Year.lte(max));
        }
    }

    if let Some(price) = &filters.price {
        if let Some(min) = price.min.filter(|v| *v > 0.0) {
            cond = cond.add(car::Column::Price.gte(min));
        }
        if let Some(max) = price.max.filter(|v| *v > 0.0) {
            cond = cond.add(car::Column::Price.lte(max));
        }
    }

    if let Some(max) = filters
        .mileage
        .as_ref()
        .and_then(|m| m.max)
        .filter(|v| *v > 0.0)
    {
        cond = cond.add(car::Column::Mileage.lte(max));
    }

    cond
}

/// Searches available cars with a free text query
///
/// the query is converted to filters by the LLM, the filters used are part of the response
#[utoipa::path(
    post,
    path = "/api/smart-search",
    tag = "ai",
    request_body = SmartSearchDto,
    responses(
        (status = OK, body = SmartSearchResponse),
        (status = BAD_GATEWAY, description = "the LLM reply could not be parsed", body = SimpleError),
        (status = SERVICE_UNAVAILABLE, description = "LLM not configured", body = SimpleError),
    ),
)]
pub async fn smart_search(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<SmartSearchDto>,
) -> Result<Json<SmartSearchResponse>, (StatusCode, SimpleError)> {
    let arguments = state
        .llm
        .call_function(
            SMART_SEARCH_SYSTEM_PROMPT,
            &dto.query,
            "filterCars",
            filter_cars_schema(),
        )
        .await?;

    let filters: SmartSearchFilters = serde_json::from_value(arguments.clone())
        .map_err(|_| LlmError::BadReply(arguments.to_string()))?;

    let cars = car::Entity::find()
        .filter(smart_search_condition(&filters))
        .order_by_asc(car::Column::Id)
        .all(&state.db)
        .await
        .map_err(DbError::from)?;

    Ok(Json(SmartSearchResponse {
        success: true,
        count: cars.len(),
        filters,
        cars,
    }))
}

fn or_na<T: ToString>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| String::from("N/A"))
}

fn valuation_prompt(dto: &PredictCarDto) -> String {
    format!(
        "Given the following car specifications:
Brand: {}
Model: {}
Year: {}
Type: {}
Fuel: {}
Mileage: {}
Color: {}
Engine Size: {}
Engine Cylinders: {}
Engine Horsepower: {}
Transmission: {}
Drive Train: {}
Condition: {}
Features: {}

Please provide:
1. A reasonable market price estimate in USD
2. A condition assessment (Excellent, Good, Fair, Poor) based on the provided information

Format your response as a JSON object with 'predictedPrice' and 'predictedCondition' fields.",
        or_na(&dto.brand),
        or_na(&dto.model),
        or_na(&dto.year),
        or_na(&dto.car_type),
        or_na(&dto.fuel),
        or_na(&dto.mileage),
        or_na(&dto.color),
        or_na(&dto.engine_size),
        or_na(&dto.engine_cylinders),
        or_na(&dto.engine_horsepower),
        or_na(&dto.transmission),
        or_na(&dto.drive_train),
        or_na(&dto.condition),
        dto.features.join(", "),
    )
}

/// parses the valuation reply, models sometimes wrap the JSON in a markdown code block
fn parse_valuation_reply(reply: &str) -> Result<PredictionResponse, LlmError> {
    let trimmed = reply
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    serde_json::from_str(trimmed).map_err(|_| LlmError::BadReply(reply.to_string()))
}

/// Estimates the price and condition of a car from its specs
#[utoipa::path(
    post,
    path = "/api/cars/predict",
    tag = "ai",
    request_body = PredictCarDto,
    responses(
        (status = OK, body = PredictionResponse),
        (status = BAD_GATEWAY, description = "the LLM reply is not valid JSON", body = SimpleError),
        (status = SERVICE_UNAVAILABLE, description = "LLM not configured", body = SimpleError),
    ),
)]
pub async fn predict_car(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<PredictCarDto>,
) -> Result<Json<PredictionResponse>, (StatusCode, SimpleError)> {
    let reply = state
        .llm
        .chat(VALUATION_SYSTEM_PROMPT, &valuation_prompt(&dto), 0.7, 150)
        .await?;

    Ok(Json(parse_valuation_reply(&reply)?))
}

/// Analyzes a image of a car looking for defects
#[utoipa::path(
    post,
    path = "/api/cars/analyze-image",
    tag = "ai",
    security(("session_id" = []), ("bearer" = [])),
    request_body = AnalyzeImageDto,
    responses(
        (status = CREATED, body = AiPrediction),
        (status = NOT_FOUND, description = "Car not found", body = SimpleError),
        (status = FORBIDDEN, description = "MISSING_PERMISSIONS", body = SimpleError),
    ),
)]
pub async fn analyze_image(
    DbConnection(db): DbConnection,
    ValidatedJson(dto): ValidatedJson<AnalyzeImageDto>,
) -> Result<(StatusCode, Json<ai_prediction::Model>), (StatusCode, SimpleError)> {
    let car = find_car_or_404(&db, dto.car_id).await?;

    let now = Utc::now();

    let prediction = ai_prediction::ActiveModel {
        car_id: Set(car.id),
        model: Set(format!("{} {}", car.brand, car.model)),
        confidence: Set(IMAGE_ANALYSIS_CONFIDENCE),
        status: Set(PredictionStatus::Pending),
        image_url: Set(dto.image_url),
        defects: Set(Defects(scoring::placeholder_defects())),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    }
    .insert(&db)
    .await
    .map_err(DbError::from)?;

    Ok((StatusCode::CREATED, Json(prediction)))
}

/// Demand analysis of every car model in the inventory
#[utoipa::path(
    get,
    path = "/api/predictions",
    tag = "ai",
    security(("session_id" = []), ("bearer" = [])),
    responses(
        (status = OK, body = Vec<DemandAnalysis>),
        (status = UNAUTHORIZED, body = SimpleError),
    ),
)]
pub async fn demand_predictions(
    DbConnection(db): DbConnection,
) -> Result<Json<Vec<DemandAnalysis>>, (StatusCode, SimpleError)> {
    let rows: Vec<CarDemandRow> = car::Entity::find()
        .order_by_asc(car::Column::Id)
        .all(&db)
        .await
        .map_err(DbError::from)?
        .into_iter()
        .map(|c| CarDemandRow {
            brand: c.brand,
            model: c.model,
            status: c.status,
            created_at: c.created_at,
        })
        .collect();

    Ok(Json(scoring::demand_analysis(&rows, Utc::now())))
}

/// Every image analysis with its car, newest first
#[utoipa::path(
    get,
    path = "/api/image-analysis",
    tag = "ai",
    security(("session_id" = []), ("bearer" = [])),
    responses(
        (status = OK, body = Vec<ImageAnalysis>),
        (status = UNAUTHORIZED, body = SimpleError),
    ),
)]
pub async fn image_analysis(
    DbConnection(db): DbConnection,
) -> Result<Json<Vec<ImageAnalysis>>, (StatusCode, SimpleError)> {
    let analysis = ai_prediction::Entity::find()
        .find_also_related(car::Entity)
        .order_by_desc(ai_prediction::Column::CreatedAt)
        .order_by_desc(ai_prediction::Column::Id)
        .all(&db)
        .await
        .map_err(DbError::from)?
        .into_iter()
        .map(|(prediction, car)| {
            let predicted_value = car
                .as_ref()
                .map(|c| c.price * scoring::condition_multiplier(c.condition))
                .unwrap_or_default();

            ImageAnalysis {
                damage_score: scoring::damage_score(&prediction.defects.0),
                predicted_value,
                prediction,
                car,
            }
        })
        .collect();

    Ok(Json(analysis))
}

/// Sets the status of a image analysis
#[utoipa::path(
    patch,
    path = "/api/predictions/{id}/status",
    tag = "ai",
    security(("session_id" = []), ("bearer" = [])),
    params(("id" = i32, Path, description = "prediction id")),
    request_body = UpdatePredictionStatusDto,
    responses(
        (status = OK, body = AiPrediction),
        (status = NOT_FOUND, description = "Prediction not found", body = SimpleError),
    ),
)]
pub async fn update_prediction_status(
    Path(id): Path<i32>,
    DbConnection(db): DbConnection,
    ValidatedJson(dto): ValidatedJson<UpdatePredictionStatusDto>,
) -> Result<Json<ai_prediction::Model>, (StatusCode, SimpleError)> {
    let found = ai_prediction::Entity::find_by_id(id)
        .one(&db)
        .await
        .map_err(DbError::from)?
        .ok_or_else(|| not_found("Prediction not found"))?;

    let mut to_update: ai_prediction::ActiveModel = found.into();
    to_update.status = Set(dto.status);
    to_update.updated_at = Set(Utc::now().into());

    let updated = to_update.update(&db).await.map_err(DbError::from)?;

    Ok(Json(updated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::ai::dto::NumberRange;
    use sea_orm::{DbBackend, QueryTrait};

    #[test]
    fn smart_search_always_filters_available_cars() {
        let sql = car::Entity::find()
            .filter(smart_search_condition(&SmartSearchFilters::default()))
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#""car"."status" = 'available'"#));
        assert!(!sql.contains("LIKE"));
    }

    #[test]
    fn smart_search_maps_text_and_range_filters() {
        let filters = SmartSearchFilters {
            brand: Some(String::from("Tesla")),
            fuel: Some(String::from("electric")),
            price: Some(NumberRange {
                min: None,
                max: Some(50000.0),
            }),
            ..Default::default()
        };

        let sql = car::Entity::find()
            .filter(smart_search_condition(&filters))
            .build(DbBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#"LOWER("brand") LIKE '%tesla%'"#));
        assert!(sql.contains(r#"LOWER("fuel") LIKE '%electric%'"#));
        assert!(sql.contains(r#""car"."price" <= 50000"#));
    }

    #[test]
    fn parses_filters_extracted_by_the_llm() {
        let filters: SmartSearchFilters = serde_json::from_value(json!({
            "type": "SUV",
            "year": { "min": 2020 },
            "mileage": { "max": 30000 }
        }))
        .unwrap();

        assert_eq!(filters.car_type.as_deref(), Some("SUV"));
        assert_eq!(filters.year.and_then(|y| y.min), Some(2020.0));
        assert_eq!(filters.mileage.and_then(|m| m.max), Some(30000.0));
    }

    #[test]
    fn parses_valuation_replies() {
        let plain = parse_valuation_reply(
            r#"{"predictedPrice": 25000, "predictedCondition": "Good"}"#,
        );

        assert_eq!(
            plain.ok(),
            Some(PredictionResponse {
                predicted_price: json!(25000),
                predicted_condition: json!("Good"),
            })
        );

        let fenced = parse_valuation_reply(
            "```json\n{\"predictedPrice\": \"$18,500\", \"predictedCondition\": \"Fair\"}\n```",
        );
        assert!(fenced.is_ok());

        assert!(matches!(
            parse_valuation_reply("I think around 20k"),
            Err(LlmError::BadReply(_))
        ));
    }

    #[test]
    fn valuation_prompt_lists_missing_specs_as_na() {
        let prompt = valuation_prompt(&PredictCarDto {
            brand: Some(String::from("Honda")),
            features: vec![String::from("Sunroof"), String::from("GPS")],
            ..Default::default()
        });

        assert!(prompt.contains("Brand: Honda\n"));
        assert!(prompt.contains("Model: N/A\n"));
        assert!(prompt.contains("Features: Sunroof, GPS\n"));
    }
}
