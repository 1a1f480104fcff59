use super::dto::{DeleteUserDto, UpdateProfileDto, UpdateUserPasswordDto, UpdateUserRoleDto};
use crate::{
    database::{
        error::DbError,
        helpers::{set_if_some, set_nullable_if_some},
    },
    modules::{
        auth::{
            dto::{SignIn, SignInResponse, SignUp, SignUpResponse, UserDto},
            middleware::{optional_user, require_user, MaybeRequestUser, RequestUser, RoleLayer},
            service::UserFromCredentialsError,
            session::get_session_id_from_request_headers,
        },
        common::{
            dto::MessageResponse,
            extractors::{DbConnection, ValidatedJson},
            responses::{bad_request, internal_error_msg, not_found, SimpleError},
        },
    },
    server::controller::AppState,
};
use axum::{
    extract::State,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use axum_client_ip::SecureClientIp;
use axum_extra::{headers::UserAgent, TypedHeader};
use entity::{traits::QueryableByEmail, user};
use http::{header::SET_COOKIE, HeaderMap, StatusCode};
use sea_orm::{ActiveModelTrait, EntityTrait, ModelTrait, QueryOrder, Set};
use tracing::info;

pub fn create_router(state: AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/", get(list_users))
        .route("/update", put(update_user_role))
        .route("/update-password", put(update_user_password))
        .route("/delete", delete(delete_user))
        .route_layer(RoleLayer::admin())
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_user,
        ));

    let user = Router::new()
        .route("/profile", put(update_profile))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_user,
        ));

    let optional = Router::new()
        .route("/current-user", get(current_user))
        .route_layer(axum::middleware::from_fn_with_state(state, optional_user));

    Router::new()
        .route("/signup", post(sign_up))
        .route("/login", post(sign_in))
        .route("/logout", get(sign_out))
        .merge(admin)
        .merge(user)
        .merge(optional)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Lists all users
#[utoipa::path(
    get,
    path = "/users",
    tag = "user",
    security(("session_id" = []), ("bearer" = [])),
    responses(
        (status = OK, body = Vec<UserDto>),
        (status = FORBIDDEN, description = "MISSING_PERMISSIONS", body = SimpleError),
    ),
)]
pub async fn list_users(
    DbConnection(db): DbConnection,
) -> Result<Json<Vec<UserDto>>, (StatusCode, SimpleError)> {
    let users = user::Entity::find()
        .order_by_asc(user::Column::Id)
        .all(&db)
        .await
        .map_err(DbError::from)?
        .into_iter()
        .map(UserDto::from)
        .collect();

    Ok(Json(users))
}

/// Creates a new user with the `user` role
#[utoipa::path(
    post,
    path = "/users/signup",
    tag = "user",
    request_body = SignUp,
    responses(
        (status = CREATED, body = SignUpResponse),
        (
            status = BAD_REQUEST,
            description = "Missing required fields / Email already registered",
            body = SimpleError,
        ),
    ),
)]
pub async fn sign_up(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<SignUp>,
) -> Result<(StatusCode, Json<SignUpResponse>), (StatusCode, SimpleError)> {
    let (Some(email), Some(password), Some(first_name), Some(last_name)) = (
        non_empty(dto.email),
        dto.password.filter(|p| !p.is_empty()),
        non_empty(dto.first_name),
        non_empty(dto.last_name),
    ) else {
        return Err(bad_request("Missing required fields"));
    };

    let email_in_use = state
        .auth_service
        .check_email_in_use(&email)
        .await
        .or(Err(internal_error_msg("failed to check email availability")))?;

    if email_in_use {
        return Err(bad_request("Email already registered"));
    }

    let created = state
        .auth_service
        .register_user(email, password, first_name, last_name)
        .await
        .map_err(|e| match e.downcast::<sea_orm::DbErr>() {
            Ok(db_err) => <(StatusCode, SimpleError)>::from(DbError(db_err)),
            Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, SimpleError::from(e)),
        })?;

    info!("[AUTH] user {} signed up", created.id);

    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            message: String::from("User created successfully"),
            user: UserDto::from(created),
        }),
    ))
}

/// Signs in with email and password
///
/// creates a new session, returned on the `sid` cookie, and a JWT that can be used
/// as a bearer token by clients that do not keep cookies
#[utoipa::path(
    post,
    path = "/users/login",
    tag = "user",
    request_body = SignIn,
    responses(
        (
            status = OK,
            body = SignInResponse,
            headers(("Set-Cookie" = String, description = "new session id cookie"))
        ),
        (status = BAD_REQUEST, description = "Missing required fields", body = SimpleError),
        (status = UNAUTHORIZED, description = "Invalid email or password", body = SimpleError),
    ),
)]
pub async fn sign_in(
    State(state): State<AppState>,
    SecureClientIp(client_ip): SecureClientIp,
    user_agent: Option<TypedHeader<UserAgent>>,
    ValidatedJson(dto): ValidatedJson<SignIn>,
) -> Result<(HeaderMap, Json<SignInResponse>), (StatusCode, SimpleError)> {
    let (Some(email), Some(password)) = (non_empty(dto.email), dto.password) else {
        return Err(bad_request("Missing required fields"));
    };

    let invalid_credentials = (
        StatusCode::UNAUTHORIZED,
        SimpleError::from("Invalid email or password"),
    );

    let user = state
        .auth_service
        .get_user_from_credentials(&email, &password)
        .await
        .map_err(|e| match e {
            UserFromCredentialsError::NotFound | UserFromCredentialsError::InvalidPassword => {
                invalid_credentials.clone()
            }
            UserFromCredentialsError::InternalError => internal_error_msg("failed to sign in"),
        })?;

    let user_agent = user_agent
        .map(|TypedHeader(ua)| ua.as_str().to_string())
        .unwrap_or_default();

    let session_id = state
        .auth_service
        .new_session(user.id, client_ip, user_agent)
        .await
        .or(Err(internal_error_msg("failed to create session")))?;

    let token = state
        .auth_service
        .gen_user_token(user.id)
        .or(Err(internal_error_msg("failed to create token")))?;

    let mut headers = HeaderMap::new();

    if let Some(cookie) = session_id.into_set_cookie_header() {
        headers.insert(SET_COOKIE, cookie);
    }

    Ok((
        headers,
        Json(SignInResponse {
            message: String::from("Login successful"),
            user: UserDto::from(user),
            token,
        }),
    ))
}

/// Signs out of the current session
///
/// deletes the session on the `sid` cookie, if any, and expires the cookie
#[utoipa::path(
    get,
    path = "/users/logout",
    tag = "user",
    responses(
        (
            status = OK,
            body = MessageResponse,
            headers(("Set-Cookie" = String, description = "expired cookie sid, so the client browser deletes the cookie"))
        ),
    ),
)]
pub async fn sign_out(
    State(state): State<AppState>,
    req_headers: HeaderMap,
) -> Result<(HeaderMap, Json<MessageResponse>), (StatusCode, SimpleError)> {
    let mut headers = HeaderMap::new();

    if let Some(session_id) = get_session_id_from_request_headers(&req_headers) {
        state
            .auth_service
            .delete_session(&session_id)
            .await
            .or(Err(internal_error_msg("failed to delete session")))?;

        if let Some(cookie) = session_id.into_delete_cookie_header() {
            headers.insert(SET_COOKIE, cookie);
        }
    }

    Ok((headers, Json(MessageResponse::from("Logged out successfully"))))
}

/// Returns the request user
#[utoipa::path(
    get,
    path = "/users/current-user",
    tag = "user",
    security((), ("session_id" = []), ("bearer" = [])),
    responses(
        (status = OK, body = UserDto),
        (status = UNAUTHORIZED, description = "Not authenticated", body = SimpleError),
    ),
)]
pub async fn current_user(
    MaybeRequestUser(req_user): MaybeRequestUser,
) -> Result<Json<UserDto>, (StatusCode, SimpleError)> {
    req_user.map(Json).ok_or((
        StatusCode::UNAUTHORIZED,
        SimpleError::from("Not authenticated"),
    ))
}

async fn find_user_by_email_or_404(
    db: &sea_orm::DatabaseConnection,
    email: &str,
) -> Result<user::Model, (StatusCode, SimpleError)> {
    user::Entity::find_by_email(email, db)
        .await
        .map_err(DbError::from)?
        .ok_or_else(|| not_found("User not found"))
}

/// Changes the role of a user
#[utoipa::path(
    put,
    path = "/users/update",
    tag = "user",
    security(("session_id" = []), ("bearer" = [])),
    request_body = UpdateUserRoleDto,
    responses(
        (status = OK, body = MessageResponse),
        (status = NOT_FOUND, description = "User not found", body = SimpleError),
    ),
)]
pub async fn update_user_role(
    DbConnection(db): DbConnection,
    ValidatedJson(dto): ValidatedJson<UpdateUserRoleDto>,
) -> Result<Json<MessageResponse>, (StatusCode, SimpleError)> {
    let found = find_user_by_email_or_404(&db, &dto.email).await?;

    let mut to_update: user::ActiveModel = found.into();
    to_update.role = Set(dto.role);
    to_update.update(&db).await.map_err(DbError::from)?;

    Ok(Json(MessageResponse {
        message: format!("User role updated to {}", dto.role),
    }))
}

/// Sets a new password for a user
#[utoipa::path(
    put,
    path = "/users/update-password",
    tag = "user",
    security(("session_id" = []), ("bearer" = [])),
    request_body = UpdateUserPasswordDto,
    responses(
        (status = OK, body = MessageResponse),
        (status = NOT_FOUND, description = "User not found", body = SimpleError),
    ),
)]
pub async fn update_user_password(
    DbConnection(db): DbConnection,
    ValidatedJson(dto): ValidatedJson<UpdateUserPasswordDto>,
) -> Result<Json<MessageResponse>, (StatusCode, SimpleError)> {
    let found = find_user_by_email_or_404(&db, &dto.email).await?;

    let mut to_update: user::ActiveModel = found.into();

    // hashed on save
    to_update.password = Set(Some(dto.password));
    to_update.update(&db).await.map_err(DbError::from)?;

    Ok(Json(MessageResponse::from("Password updated successfully")))
}

/// Deletes a user and, by cascade, their sessions and chat messages
#[utoipa::path(
    delete,
    path = "/users/delete",
    tag = "user",
    security(("session_id" = []), ("bearer" = [])),
    request_body = DeleteUserDto,
    responses(
        (status = OK, body = MessageResponse),
        (status = NOT_FOUND, description = "User not found", body = SimpleError),
    ),
)]
pub async fn delete_user(
    DbConnection(db): DbConnection,
    ValidatedJson(dto): ValidatedJson<DeleteUserDto>,
) -> Result<Json<MessageResponse>, (StatusCode, SimpleError)> {
    let found = find_user_by_email_or_404(&db, &dto.email).await?;

    found.delete(&db).await.map_err(DbError::from)?;

    Ok(Json(MessageResponse::from("User deleted successfully")))
}

/// Updates the request user profile
#[utoipa::path(
    put,
    path = "/users/profile",
    tag = "user",
    security(("session_id" = []), ("bearer" = [])),
    request_body = UpdateProfileDto,
    responses(
        (status = OK, description = "the updated user", body = UserDto),
        (status = BAD_REQUEST, body = SimpleError),
    ),
)]
pub async fn update_profile(
    DbConnection(db): DbConnection,
    Extension(req_user): Extension<RequestUser>,
    ValidatedJson(dto): ValidatedJson<UpdateProfileDto>,
) -> Result<Json<UserDto>, (StatusCode, SimpleError)> {
    let found = user::Entity::find_by_id(req_user.0.id)
        .one(&db)
        .await
        .map_err(DbError::from)?
        .ok_or_else(|| not_found("User not found"))?;

    let mut to_update: user::ActiveModel = found.into();

    set_if_some(&mut to_update.first_name, dto.first_name);
    set_if_some(&mut to_update.last_name, dto.last_name);
    set_if_some(&mut to_update.display_name, dto.display_name);
    set_if_some(&mut to_update.language, dto.language);
    set_if_some(&mut to_update.car_preferences, dto.car_preferences);
    set_nullable_if_some(&mut to_update.phone_number, dto.phone_number);
    set_nullable_if_some(&mut to_update.date_of_birth, dto.date_of_birth);
    set_nullable_if_some(&mut to_update.profile_photo, dto.profile_photo);

    let updated = to_update.update(&db).await.map_err(DbError::from)?;

    Ok(Json(UserDto::from(updated)))
}
