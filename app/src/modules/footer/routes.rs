use super::dto::UpdateFooterDto;
use crate::{
    database::{error::DbError, helpers::set_if_some},
    modules::{
        auth::middleware::{require_user, RoleLayer},
        common::{
            extractors::{DbConnection, ValidatedJson},
            responses::SimpleError,
        },
    },
    server::controller::AppState,
};
use axum::{routing::get, Json, Router};
use chrono::Utc;
use entity::footer::{self, SocialLinks, DEFAULT_COMPANY_NAME};
use http::StatusCode;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QueryOrder, Set};

pub fn create_router(state: AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/footer", axum::routing::put(update_footer))
        .route_layer(RoleLayer::admin())
        .route_layer(axum::middleware::from_fn_with_state(state, require_user));

    Router::new()
        .route("/footer", get(get_footer))
        .merge(admin)
}

async fn find_latest_footer(db: &DatabaseConnection) -> Result<Option<footer::Model>, DbErr> {
    footer::Entity::find()
        .order_by_desc(footer::Column::UpdatedAt)
        .order_by_desc(footer::Column::Id)
        .one(db)
        .await
}

/// Gets the site footer, creating the default one if there is none
#[utoipa::path(
    get,
    path = "/api/footer",
    tag = "footer",
    responses((status = OK, body = Footer)),
)]
pub async fn get_footer(
    DbConnection(db): DbConnection,
) -> Result<Json<footer::Model>, (StatusCode, SimpleError)> {
    if let Some(found) = find_latest_footer(&db).await.map_err(DbError::from)? {
        return Ok(Json(found));
    }

    let created = footer::ActiveModel {
        company_name: Set(String::from(DEFAULT_COMPANY_NAME)),
        social_links: Set(SocialLinks::default()),
        updated_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(&db)
    .await
    .map_err(DbError::from)?;

    Ok(Json(created))
}

/// Updates the site footer
#[utoipa::path(
    put,
    path = "/api/footer",
    tag = "footer",
    security(("session_id" = []), ("bearer" = [])),
    request_body = UpdateFooterDto,
    responses(
        (status = OK, description = "the updated footer", body = Footer),
        (status = FORBIDDEN, description = "MISSING_PERMISSIONS", body = SimpleError),
    ),
)]
pub async fn update_footer(
    DbConnection(db): DbConnection,
    ValidatedJson(dto): ValidatedJson<UpdateFooterDto>,
) -> Result<Json<footer::Model>, (StatusCode, SimpleError)> {
    let footer = match find_latest_footer(&db).await.map_err(DbError::from)? {
        Some(found) => {
            let mut to_update: footer::ActiveModel = found.into();

            set_if_some(&mut to_update.company_name, dto.company_name);
            set_if_some(&mut to_update.social_links, dto.social_links);
            to_update.updated_at = Set(Utc::now().into());

            to_update.update(&db).await
        }
        None => {
            footer::ActiveModel {
                company_name: Set(dto
                    .company_name
                    .unwrap_or_else(|| String::from(DEFAULT_COMPANY_NAME))),
                social_links: Set(dto.social_links.unwrap_or_default()),
                updated_at: Set(Utc::now().into()),
                ..Default::default()
            }
            .insert(&db)
            .await
        }
    }
    .map_err(DbError::from)?;

    Ok(Json(footer))
}
