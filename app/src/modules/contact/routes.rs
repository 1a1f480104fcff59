use super::dto::SubmitMessageDto;
use crate::{
    database::error::DbError,
    modules::{
        auth::middleware::{require_user, RoleLayer},
        common::{
            dto::MessageResponse,
            extractors::{DbConnection, ValidatedJson},
            responses::{bad_request, not_found, SimpleError},
        },
    },
    server::controller::AppState,
};
use axum::{
    extract::Path,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use entity::message;
use http::StatusCode;
use sea_orm::{ActiveModelTrait, EntityTrait, ModelTrait, QueryOrder, Set};

pub fn create_router(state: AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/messages", get(list_messages))
        .route("/messages/:id", delete(delete_message))
        .route_layer(RoleLayer::admin())
        .route_layer(axum::middleware::from_fn_with_state(state, require_user));

    Router::new()
        .route("/submit", post(submit_message))
        .merge(admin)
}

fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Submits the contact form
#[utoipa::path(
    post,
    path = "/api/submit",
    tag = "contact",
    request_body = SubmitMessageDto,
    responses(
        (status = CREATED, body = MessageResponse),
        (status = BAD_REQUEST, description = "All fields are required.", body = SimpleError),
    ),
)]
pub async fn submit_message(
    DbConnection(db): DbConnection,
    ValidatedJson(dto): ValidatedJson<SubmitMessageDto>,
) -> Result<(StatusCode, Json<MessageResponse>), (StatusCode, SimpleError)> {
    let (Some(full_name), Some(email), Some(topic), Some(message)) = (
        required(dto.full_name),
        required(dto.email),
        required(dto.topic),
        required(dto.message),
    ) else {
        return Err(bad_request("All fields are required."));
    };

    message::ActiveModel {
        full_name: Set(full_name),
        email: Set(email),
        phone: Set(dto.phone),
        car_model: Set(dto.car_model),
        preferred_date: Set(dto.preferred_date),
        topic: Set(topic),
        message: Set(message),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(&db)
    .await
    .map_err(DbError::from)?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::from("Message sent successfully!")),
    ))
}

/// Lists every contact message, newest first
#[utoipa::path(
    get,
    path = "/api/messages",
    tag = "contact",
    security(("session_id" = []), ("bearer" = [])),
    responses(
        (status = OK, body = Vec<Message>),
        (status = FORBIDDEN, description = "MISSING_PERMISSIONS", body = SimpleError),
    ),
)]
pub async fn list_messages(
    DbConnection(db): DbConnection,
) -> Result<Json<Vec<message::Model>>, (StatusCode, SimpleError)> {
    let messages = message::Entity::find()
        .order_by_desc(message::Column::CreatedAt)
        .order_by_desc(message::Column::Id)
        .all(&db)
        .await
        .map_err(DbError::from)?;

    Ok(Json(messages))
}

/// Deletes a contact message
#[utoipa::path(
    delete,
    path = "/api/messages/{id}",
    tag = "contact",
    security(("session_id" = []), ("bearer" = [])),
    params(("id" = i32, Path, description = "message id")),
    responses(
        (status = OK, body = MessageResponse),
        (status = NOT_FOUND, description = "Message not found", body = SimpleError),
    ),
)]
pub async fn delete_message(
    Path(id): Path<i32>,
    DbConnection(db): DbConnection,
) -> Result<Json<MessageResponse>, (StatusCode, SimpleError)> {
    let found = message::Entity::find_by_id(id)
        .one(&db)
        .await
        .map_err(DbError::from)?
        .ok_or_else(|| not_found("Message not found"))?;

    found.delete(&db).await.map_err(DbError::from)?;

    Ok(Json(MessageResponse::from("Message deleted successfully!")))
}
