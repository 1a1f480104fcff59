use super::{
    dto::{ChatDto, ChatReply},
    intent::{self, Intent, LISTED_CARS_LIMIT},
};
use crate::{
    database::error::DbError,
    modules::{
        auth::middleware::{optional_user, require_user, MaybeRequestUser, RoleLayer},
        common::{
            dto::DeletedCountResponse,
            extractors::{DbConnection, ValidatedJson},
            responses::{bad_request, SimpleError},
        },
    },
    server::controller::AppState,
    services::llm::LlmClient,
};
use axum::{extract::State, routing::get, routing::post, Json, Router};
use chrono::Utc;
use entity::{
    car, chat_log,
    sea_orm_active_enums::{CarStatus, Fuel},
};
use http::StatusCode;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tracing::{error, warn};

const ASSISTANT_SYSTEM_PROMPT: &str = "You are a helpful assistant for a car dealership. Answer questions about buying, selling and test driving cars briefly and politely. If you do not know something about the inventory, suggest contacting the dealership.";

pub fn create_router(state: AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/chat/logs", get(list_chat_logs).delete(clear_chat_logs))
        .route_layer(RoleLayer::admin())
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_user,
        ));

    Router::new()
        .route("/chat", post(chat))
        .route_layer(axum::middleware::from_fn_with_state(state, optional_user))
        .merge(admin)
}

/// answers a intent that needs the inventory
async fn inventory_reply(db: &DatabaseConnection, intent: Intent) -> Result<Option<String>, DbErr> {
    let reply = match intent {
        Intent::CheapestCars => {
            let cars = car::Entity::find()
                .filter(car::Column::Status.eq(CarStatus::Available))
                .order_by_asc(car::Column::Price)
                .limit(LISTED_CARS_LIMIT)
                .all(db)
                .await?;

            intent::cheapest_cars_reply(&cars)
        }
        Intent::NewestCars => {
            let cars = car::Entity::find()
                .order_by_desc(car::Column::Year)
                .order_by_asc(car::Column::Id)
                .limit(LISTED_CARS_LIMIT)
                .all(db)
                .await?;

            intent::newest_cars_reply(&cars)
        }
        Intent::ElectricCars => {
            let cars = car::Entity::find()
                .filter(car::Column::Fuel.eq(Fuel::Electric))
                .filter(car::Column::Status.eq(CarStatus::Available))
                .order_by_asc(car::Column::Id)
                .all(db)
                .await?;

            intent::electric_cars_reply(&cars)
        }
        Intent::CarsFromYear(year) => {
            let cars = car::Entity::find()
                .filter(car::Column::Year.eq(year))
                .filter(car::Column::Status.eq(CarStatus::Available))
                .order_by_asc(car::Column::Id)
                .all(db)
                .await?;

            intent::cars_from_year_reply(year, &cars)
        }
        _ => return Ok(None),
    };

    Ok(Some(reply))
}

/// reply for messages without a known intent, the LLM answers them when configured
async fn fallback_reply(llm: &LlmClient, message: &str) -> String {
    if !llm.is_enabled() {
        return intent::default_reply(message);
    }

    match llm.chat(ASSISTANT_SYSTEM_PROMPT, message, 0.7, 200).await {
        Ok(reply) if !reply.trim().is_empty() => reply.trim().to_string(),
        Ok(_) => intent::default_reply(message),
        Err(e) => {
            warn!("[LLM] chatbot fallback failed: {e}");
            intent::default_reply(message)
        }
    }
}

async fn reply_to(state: &AppState, message: &str) -> String {
    let intent = Intent::detect(message);

    if let Some(reply) = intent.canned_reply() {
        return String::from(reply);
    }

    match inventory_reply(&state.db, intent).await {
        Ok(Some(reply)) => reply,
        Ok(None) => fallback_reply(&state.llm, message).await,
        Err(e) => {
            error!("[DB] chatbot query failed: {e}");
            String::from(intent::DATABASE_ERROR_REPLY)
        }
    }
}

/// Sends a message to the chatbot
///
/// every turn is logged with the email of the request user, or `anonymous`
#[utoipa::path(
    post,
    path = "/api/chat",
    tag = "chatbot",
    security((), ("session_id" = []), ("bearer" = [])),
    request_body = ChatDto,
    responses(
        (status = OK, body = ChatReply),
        (status = BAD_REQUEST, description = "Message is required", body = SimpleError),
    ),
)]
pub async fn chat(
    State(state): State<AppState>,
    MaybeRequestUser(req_user): MaybeRequestUser,
    ValidatedJson(dto): ValidatedJson<ChatDto>,
) -> Result<Json<ChatReply>, (StatusCode, SimpleError)> {
    let message = dto
        .message
        .filter(|m| !m.is_empty())
        .ok_or_else(|| bad_request("Message is required"))?;

    let reply = reply_to(&state, &message).await;

    let user = req_user
        .map(|u| u.email)
        .unwrap_or_else(|| String::from("anonymous"));

    let log = chat_log::ActiveModel {
        user: Set(user),
        message: Set(message),
        response: Set(reply.clone()),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };

    if let Err(e) = log.insert(&state.db).await {
        error!("[DB] failed to save chat log: {e}");
    }

    Ok(Json(ChatReply { reply }))
}

/// Lists the chatbot turns, newest first
#[utoipa::path(
    get,
    path = "/api/chat/logs",
    tag = "chatbot",
    security(("session_id" = []), ("bearer" = [])),
    responses(
        (status = OK, body = Vec<ChatLog>),
        (status = FORBIDDEN, description = "MISSING_PERMISSIONS", body = SimpleError),
    ),
)]
pub async fn list_chat_logs(
    DbConnection(db): DbConnection,
) -> Result<Json<Vec<chat_log::Model>>, (StatusCode, SimpleError)> {
    let logs = chat_log::Entity::find()
        .order_by_desc(chat_log::Column::CreatedAt)
        .order_by_desc(chat_log::Column::Id)
        .all(&db)
        .await
        .map_err(DbError::from)?;

    Ok(Json(logs))
}

/// Deletes every chatbot turn
#[utoipa::path(
    delete,
    path = "/api/chat/logs",
    tag = "chatbot",
    security(("session_id" = []), ("bearer" = [])),
    responses(
        (status = OK, body = DeletedCountResponse),
        (status = FORBIDDEN, description = "MISSING_PERMISSIONS", body = SimpleError),
    ),
)]
pub async fn clear_chat_logs(
    DbConnection(db): DbConnection,
) -> Result<Json<DeletedCountResponse>, (StatusCode, SimpleError)> {
    let res = chat_log::Entity::delete_many()
        .exec(&db)
        .await
        .map_err(DbError::from)?;

    Ok(Json(DeletedCountResponse {
        message: String::from("Chat logs cleared successfully"),
        deleted_count: res.rows_affected,
    }))
}
