use super::dto::{CreateBookingDto, UpdateBookingStatusDto};
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
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use entity::{booking, sea_orm_active_enums::BookingStatus};
use http::StatusCode;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use tracing::info;

pub fn create_router(state: AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/test-drives", get(list_bookings))
        .route(
            "/test-drives/:id",
            put(update_booking_status).delete(delete_booking),
        )
        .route_layer(RoleLayer::admin())
        .route_layer(axum::middleware::from_fn_with_state(state, require_user));

    Router::new()
        .route("/test-drive", post(create_booking))
        .merge(admin)
}

/// checks if a slot has a booking that was not rejected
///
/// the check and the following insert are not atomic, two concurrent requests for the
/// same slot might both succeed
pub async fn is_slot_taken(
    db: &DatabaseConnection,
    car_model: &str,
    date: &str,
    time: &str,
) -> Result<bool, DbError> {
    let count = booking::Entity::find()
        .filter(booking::Column::CarModel.eq(car_model))
        .filter(booking::Column::Date.eq(date))
        .filter(booking::Column::Time.eq(time))
        .filter(booking::Column::Status.is_in([BookingStatus::Pending, BookingStatus::Approved]))
        .count(db)
        .await?;

    Ok(count > 0)
}

async fn find_booking_or_404(
    db: &DatabaseConnection,
    id: i32,
) -> Result<booking::Model, (StatusCode, SimpleError)> {
    booking::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(DbError::from)?
        .ok_or_else(|| not_found("Booking not found"))
}

/// Books a test drive
///
/// a slot (car model, date and time) can only have one pending or approved booking
#[utoipa::path(
    post,
    path = "/api/test-drive",
    tag = "booking",
    request_body = CreateBookingDto,
    responses(
        (status = CREATED, description = "the created booking", body = Booking),
        (
            status = BAD_REQUEST,
            description = "invalid dto error message / This time slot is already booked",
            body = SimpleError,
        ),
    ),
)]
pub async fn create_booking(
    DbConnection(db): DbConnection,
    ValidatedJson(dto): ValidatedJson<CreateBookingDto>,
) -> Result<(StatusCode, Json<booking::Model>), (StatusCode, SimpleError)> {
    if is_slot_taken(&db, &dto.car_model, &dto.date, &dto.time).await? {
        return Err(bad_request("This time slot is already booked"));
    }

    let created = booking::ActiveModel {
        name: Set(dto.name),
        email: Set(dto.email),
        phone: Set(dto.phone),
        date: Set(dto.date),
        time: Set(dto.time),
        car_model: Set(dto.car_model),
        notes: Set(dto.notes.filter(|n| !n.trim().is_empty())),
        status: Set(BookingStatus::Pending),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(&db)
    .await
    .map_err(DbError::from)?;

    info!("[WEB] test drive {} booked", created.id);

    Ok((StatusCode::CREATED, Json(created)))
}

/// Lists every booking, newest first
#[utoipa::path(
    get,
    path = "/api/test-drives",
    tag = "booking",
    security(("session_id" = []), ("bearer" = [])),
    responses(
        (status = OK, body = Vec<Booking>),
        (status = FORBIDDEN, description = "MISSING_PERMISSIONS", body = SimpleError),
    ),
)]
pub async fn list_bookings(
    DbConnection(db): DbConnection,
) -> Result<Json<Vec<booking::Model>>, (StatusCode, SimpleError)> {
    let bookings = booking::Entity::find()
        .order_by_desc(booking::Column::CreatedAt)
        .order_by_desc(booking::Column::Id)
        .all(&db)
        .await
        .map_err(DbError::from)?;

    Ok(Json(bookings))
}

/// Approves or rejects a booking
#[utoipa::path(
    put,
    path = "/api/test-drives/{id}",
    tag = "booking",
    security(("session_id" = []), ("bearer" = [])),
    params(("id" = i32, Path, description = "booking id")),
    request_body = UpdateBookingStatusDto,
    responses(
        (status = OK, description = "the updated booking", body = Booking),
        (status = NOT_FOUND, description = "Booking not found", body = SimpleError),
    ),
)]
pub async fn update_booking_status(
    Path(id): Path<i32>,
    DbConnection(db): DbConnection,
    ValidatedJson(dto): ValidatedJson<UpdateBookingStatusDto>,
) -> Result<Json<booking::Model>, (StatusCode, SimpleError)> {
    let found = find_booking_or_404(&db, id).await?;

    let mut to_update: booking::ActiveModel = found.into();
    to_update.status = Set(dto.status);

    let updated = to_update.update(&db).await.map_err(DbError::from)?;

    Ok(Json(updated))
}

/// Deletes a booking
#[utoipa::path(
    delete,
    path = "/api/test-drives/{id}",
    tag = "booking",
    security(("session_id" = []), ("bearer" = [])),
    params(("id" = i32, Path, description = "booking id")),
    responses(
        (status = OK, body = MessageResponse),
        (status = NOT_FOUND, description = "Booking not found", body = SimpleError),
    ),
)]
pub async fn delete_booking(
    Path(id): Path<i32>,
    DbConnection(db): DbConnection,
) -> Result<Json<MessageResponse>, (StatusCode, SimpleError)> {
    let found = find_booking_or_404(&db, id).await?;

    found.delete(&db).await.map_err(DbError::from)?;

    Ok(Json(MessageResponse::from("Booking deleted successfully")))
}
