use super::{
    dto::{
        parse_car_ids, parse_features, BulkDeleteCarsDto, BulkDeleteCarsResponse, CreateCarDto,
        ListCarsDto, MonthlySales, UpdateCarDto, MAX_IMAGES_PER_REQUEST,
    },
    filter::CarFilter,
    images::{self, catalog_image_urls, check_images_exist, default_images, merge_images},
    repository,
};
use crate::{
    config::app_config,
    database::{
        error::DbError,
        helpers::{set_if_some, set_nullable_if_some},
    },
    modules::{
        auth::middleware::{require_user, RoleLayer},
        common::{
            dto::MessageResponse,
            extractors::{DbConnection, ValidatedJson, ValidatedMultipart, ValidatedQuery},
            multipart_form_data::{images_from_fields, ImageUpload},
            responses::{bad_request, internal_error_msg, ApiError, SimpleError},
        },
    },
    server::controller::AppState,
    services::s3::ObjectStore,
};
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use axum_typed_multipart::FieldData;
use entity::{
    car::{self, CarFeatures, CarImages},
    sea_orm_active_enums::{CarStatus, DriveTrain},
};
use http::StatusCode;
use sea_orm::{ActiveModelTrait, ModelTrait, Set};
use std::str::FromStr;
use tracing::info;

pub fn create_router(state: AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/cars", post(create_car))
        .route("/cars/bulk-delete", delete(bulk_delete_cars))
        .route(
            "/cars/:id",
            axum::routing::put(update_car).delete(delete_car),
        )
        .route("/cars/:id/images/refresh", post(refresh_car_images))
        .route_layer(RoleLayer::admin())
        .route_layer(axum::middleware::from_fn_with_state(state, require_user));

    Router::new()
        .route("/cars", get(list_cars))
        .route("/cars/sold", get(list_sold_cars))
        .route("/cars/sales/monthly", get(monthly_sales))
        .route("/cars/:id", get(get_car))
        .merge(admin)
}

/// parses a enum sent as plain text on a multipart field
fn parse_field<T: FromStr>(field: &str, value: &str) -> Result<T, (StatusCode, SimpleError)> {
    T::from_str(value.trim()).map_err(|_| bad_request(&format!("invalid {}: {}", field, value)))
}

fn parse_drive_train(value: &str) -> Result<DriveTrain, (StatusCode, SimpleError)> {
    parse_field("driveTrain", &value.to_uppercase())
}

fn parse_optional<T: FromStr>(
    field: &str,
    value: Option<String>,
) -> Result<Option<T>, (StatusCode, SimpleError)> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| parse_field(field, &v))
        .transpose()
}

fn validate_image_fields(
    fields: Vec<FieldData<axum::body::Bytes>>,
) -> Result<Vec<ImageUpload>, (StatusCode, SimpleError)> {
    if fields.len() > MAX_IMAGES_PER_REQUEST {
        return Err(bad_request(&format!(
            "You can upload a maximum of {} images",
            MAX_IMAGES_PER_REQUEST
        )));
    }

    images_from_fields(fields)
}

/// uploads every image to the object store, returning their public urls in order
///
/// uploads left unreferenced, such as when saving the car fails, are removed by the orphan
/// images cronjob
async fn upload_images(
    store: &ObjectStore,
    uploads: Vec<ImageUpload>,
) -> Result<Vec<String>, (StatusCode, SimpleError)> {
    let mut urls = Vec::with_capacity(uploads.len());

    for upload in uploads {
        let url = store
            .upload_deduplicated(&upload.file_name, &upload.content_type, upload.bytes)
            .await
            .map_err(|e| {
                tracing::error!("[S3] {e:#}");
                internal_error_msg("failed to upload car images")
            })?;

        urls.push(url);
    }

    Ok(urls)
}

/// Lists cars
///
/// results are in id order unless a valid `sortBy` is given
#[utoipa::path(
    get,
    path = "/api/cars",
    tag = "car",
    params(ListCarsDto),
    responses(
        (status = OK, body = Vec<Car>),
        (status = BAD_REQUEST, description = "invalid driveTrain", body = SimpleError),
    ),
)]
pub async fn list_cars(
    DbConnection(db): DbConnection,
    ValidatedQuery(dto): ValidatedQuery<ListCarsDto>,
) -> Result<Json<Vec<car::Model>>, (StatusCode, SimpleError)> {
    let filter = CarFilter::try_from(dto).map_err(|e| bad_request(&e))?;

    let cars = filter
        .into_select()
        .all(&db)
        .await
        .map_err(DbError::from)?;

    Ok(Json(cars))
}

/// Lists sold cars
#[utoipa::path(
    get,
    path = "/api/cars/sold",
    tag = "car",
    responses((status = OK, body = Vec<Car>)),
)]
pub async fn list_sold_cars(
    DbConnection(db): DbConnection,
) -> Result<Json<Vec<car::Model>>, (StatusCode, SimpleError)> {
    let cars = repository::find_sold_cars(&db)
        .await
        .map_err(DbError::from)?;

    Ok(Json(cars))
}

/// Sales of the last 12 months with sales, newest first
#[utoipa::path(
    get,
    path = "/api/cars/sales/monthly",
    tag = "car",
    responses((status = OK, body = Vec<MonthlySales>)),
)]
pub async fn monthly_sales(
    DbConnection(db): DbConnection,
) -> Result<Json<Vec<MonthlySales>>, (StatusCode, SimpleError)> {
    let sales = repository::monthly_sales(&db)
        .await
        .map_err(DbError::from)?;

    Ok(Json(sales))
}

/// Gets a car by id
#[utoipa::path(
    get,
    path = "/api/cars/{id}",
    tag = "car",
    params(("id" = i32, Path, description = "car id")),
    responses(
        (status = OK, body = Car),
        (status = NOT_FOUND, description = "Car not found", body = SimpleError),
    ),
)]
pub async fn get_car(
    Path(id): Path<i32>,
    DbConnection(db): DbConnection,
) -> Result<Json<car::Model>, (StatusCode, SimpleError)> {
    Ok(Json(repository::find_car_or_404(&db, id).await?))
}

/// Creates a car
///
/// cars without images get placeholder images
#[utoipa::path(
    post,
    path = "/api/cars",
    tag = "car",
    security(("session_id" = []), ("bearer" = [])),
    request_body(content = CreateCarDto, content_type = "multipart/form-data"),
    responses(
        (status = CREATED, description = "the created car", body = Car),
        (status = BAD_REQUEST, description = "invalid dto error message", body = SimpleError),
        (status = FORBIDDEN, description = "MISSING_PERMISSIONS", body = SimpleError),
    ),
)]
pub async fn create_car(
    State(state): State<AppState>,
    ValidatedMultipart(dto): ValidatedMultipart<CreateCarDto>,
) -> Result<(StatusCode, Json<car::Model>), (StatusCode, SimpleError)> {
    let uploads = validate_image_fields(dto.images)?;

    let mut new_car = car::ActiveModel {
        brand: Set(dto.brand.trim().to_string()),
        model: Set(dto.model.trim().to_string()),
        year: Set(dto.year),
        price: Set(dto.price),
        mileage: Set(dto.mileage),
        fuel: Set(parse_field("fuel", &dto.fuel)?),
        transmission: Set(parse_field("transmission", &dto.transmission)?),
        condition: Set(parse_field("condition", &dto.condition)?),
        description: Set(dto.description),
        color: Set(dto.color),
        car_type: Set(parse_optional("carType", dto.car_type)?),
        drive_train: Set(dto
            .drive_train
            .filter(|v| !v.trim().is_empty())
            .map(|v| parse_drive_train(&v))
            .transpose()?),
        status: Set(parse_optional("status", dto.status)?.unwrap_or(CarStatus::Available)),
        engine_size: Set(dto.engine_size),
        engine_cylinders: Set(dto.engine_cylinders),
        engine_horsepower: Set(dto.engine_horsepower),
        rating: Set(dto.rating),
        features: Set(CarFeatures(
            dto.features.as_deref().map(parse_features).unwrap_or_default(),
        )),
        ..Default::default()
    };

    let images = if uploads.is_empty() {
        default_images()
    } else {
        images::uploaded_images(upload_images(&state.store, uploads).await?)
    };

    new_car.images = Set(images);

    let created = new_car.insert(&state.db).await.map_err(DbError::from)?;

    info!("[WEB] car {} created", created.id);

    Ok((StatusCode::CREATED, Json(created)))
}

/// Updates a car
///
/// the images of the car are the `retainedImages` (or every current image when absent)
/// followed by the new uploads
#[utoipa::path(
    put,
    path = "/api/cars/{id}",
    tag = "car",
    security(("session_id" = []), ("bearer" = [])),
    params(("id" = i32, Path, description = "car id")),
    request_body(content = UpdateCarDto, content_type = "multipart/form-data"),
    responses(
        (status = OK, description = "the updated car", body = Car),
        (status = BAD_REQUEST, description = "invalid dto error message", body = SimpleError),
        (status = NOT_FOUND, description = "Car not found", body = SimpleError),
    ),
)]
pub async fn update_car(
    Path(id): Path<i32>,
    State(state): State<AppState>,
    ValidatedMultipart(dto): ValidatedMultipart<UpdateCarDto>,
) -> Result<Json<car::Model>, (StatusCode, SimpleError)> {
    let found = repository::find_car_or_404(&state.db, id).await?;

    let retained = dto
        .retained_images
        .as_deref()
        .map(serde_json::from_str::<Vec<String>>)
        .transpose()
        .map_err(|_| bad_request("invalid retainedImages, expected a JSON array of urls"))?;

    let uploads = validate_image_fields(dto.images)?;

    let fuel = parse_optional("fuel", dto.fuel)?;
    let transmission = parse_optional("transmission", dto.transmission)?;
    let condition = parse_optional("condition", dto.condition)?;
    let status = parse_optional("status", dto.status)?;
    let car_type = parse_optional("carType", dto.car_type)?;

    let drive_train = dto
        .drive_train
        .filter(|v| !v.trim().is_empty())
        .map(|v| parse_drive_train(&v))
        .transpose()?;

    let uploaded = upload_images(&state.store, uploads).await?;
    let images: CarImages = merge_images(&found.images, retained, uploaded);

    let mut to_update: car::ActiveModel = found.into();

    set_if_some(&mut to_update.brand, dto.brand);
    set_if_some(&mut to_update.model, dto.model);
    set_if_some(&mut to_update.year, dto.year);
    set_if_some(&mut to_update.price, dto.price);
    set_if_some(&mut to_update.mileage, dto.mileage);
    set_if_some(&mut to_update.fuel, fuel);
    set_if_some(&mut to_update.transmission, transmission);
    set_if_some(&mut to_update.condition, condition);
    set_if_some(&mut to_update.status, status);
    set_if_some(&mut to_update.description, dto.description);
    set_if_some(&mut to_update.color, dto.color);
    set_if_some(
        &mut to_update.features,
        dto.features.as_deref().map(|f| CarFeatures(parse_features(f))),
    );
    set_nullable_if_some(&mut to_update.car_type, car_type);
    set_nullable_if_some(&mut to_update.drive_train, drive_train);
    set_nullable_if_some(&mut to_update.engine_size, dto.engine_size);
    set_nullable_if_some(&mut to_update.engine_cylinders, dto.engine_cylinders);
    set_nullable_if_some(&mut to_update.engine_horsepower, dto.engine_horsepower);
    set_nullable_if_some(&mut to_update.rating, dto.rating);

    to_update.images = Set(images);

    let updated = to_update.update(&state.db).await.map_err(DbError::from)?;

    Ok(Json(updated))
}

/// Deletes a car
#[utoipa::path(
    delete,
    path = "/api/cars/{id}",
    tag = "car",
    security(("session_id" = []), ("bearer" = [])),
    params(("id" = i32, Path, description = "car id")),
    responses(
        (status = OK, body = MessageResponse),
        (status = NOT_FOUND, description = "Car not found", body = SimpleError),
    ),
)]
pub async fn delete_car(
    Path(id): Path<i32>,
    DbConnection(db): DbConnection,
) -> Result<Json<MessageResponse>, (StatusCode, SimpleError)> {
    let found = repository::find_car_or_404(&db, id).await?;

    found.delete(&db).await.map_err(DbError::from)?;

    Ok(Json(MessageResponse::from("Car deleted successfully")))
}

/// Deletes many cars at once
///
/// the request is rejected if any of the ids is invalid, listing the invalid ids
#[utoipa::path(
    delete,
    path = "/api/cars/bulk-delete",
    tag = "car",
    security(("session_id" = []), ("bearer" = [])),
    request_body = BulkDeleteCarsDto,
    responses(
        (status = OK, body = BulkDeleteCarsResponse),
        (
            status = BAD_REQUEST,
            description = "No car IDs provided / Invalid car IDs provided",
            body = ApiError,
        ),
        (status = NOT_FOUND, description = "No cars found to delete", body = SimpleError),
    ),
)]
pub async fn bulk_delete_cars(
    DbConnection(db): DbConnection,
    ValidatedJson(dto): ValidatedJson<BulkDeleteCarsDto>,
) -> Result<Response, (StatusCode, SimpleError)> {
    let values = dto.car_ids.unwrap_or_default();

    if values.is_empty() {
        return Err(bad_request("No car IDs provided"));
    }

    let ids = match parse_car_ids(&values) {
        Ok(ids) => ids,
        Err(invalid) => {
            let err = ApiError {
                error: String::from("Invalid car IDs provided"),
                info: Some(invalid),
            };

            return Ok((StatusCode::BAD_REQUEST, err).into_response());
        }
    };

    let deleted_count = repository::delete_cars(&db, ids)
        .await
        .map_err(DbError::from)?;

    if deleted_count == 0 {
        return Err((
            StatusCode::NOT_FOUND,
            SimpleError::from("No cars found to delete"),
        ));
    }

    info!("[WEB] bulk deleted {} cars", deleted_count);

    Ok(Json(BulkDeleteCarsResponse {
        success: true,
        message: format!("Successfully deleted {} cars", deleted_count),
        deleted_count,
    })
    .into_response())
}

/// Replaces the images of a car with its catalog images
///
/// the catalog urls are derived from the car brand and model, each one is checked
/// with a `HEAD` request and stored with the result of the check
#[utoipa::path(
    post,
    path = "/api/cars/{id}/images/refresh",
    tag = "car",
    security(("session_id" = []), ("bearer" = [])),
    params(("id" = i32, Path, description = "car id")),
    responses(
        (status = OK, description = "the car with the refreshed images", body = Car),
        (status = NOT_FOUND, description = "Car not found", body = SimpleError),
    ),
)]
pub async fn refresh_car_images(
    Path(id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<car::Model>, (StatusCode, SimpleError)> {
    let found = repository::find_car_or_404(&state.db, id).await?;

    let cfg = app_config();

    let urls = catalog_image_urls(
        &cfg.object_store_public_url,
        &cfg.car_catalog_bucket_name,
        &found.brand,
        &found.model,
    );

    let images = check_images_exist(&state.http, urls).await;

    let mut to_update: car::ActiveModel = found.into();
    to_update.images = Set(images);

    let updated = to_update.update(&state.db).await.map_err(DbError::from)?;

    Ok(Json(updated))
}
