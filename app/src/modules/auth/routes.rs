use super::{
    dto::UserDto,
    middleware::{require_user, RequestUser, RoleLayer},
    session::{cookie_to_header_value, get_cookie_from_request_headers},
};
use crate::{
    config::app_config,
    modules::common::{
        dto::MessageResponse,
        error_codes::{INVALID_OAUTH_STATE, OAUTH_NOT_CONFIGURED},
        responses::{internal_error_msg, SimpleError},
    },
    server::controller::AppState,
    utils::string::StringExt,
};
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Extension, Json, Router,
};
use axum_client_ip::SecureClientIp;
use axum_extra::{headers::UserAgent, TypedHeader};
use cookie::{time, Cookie, SameSite};
use http::{header::SET_COOKIE, HeaderMap, StatusCode};
use serde::Deserialize;
use tracing::{error, info};
use utoipa::IntoParams;

const OAUTH_STATE_COOKIE_NAME: &str = "oauth_state";

/// routes mounted under `/auth`
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/google", get(google_sign_in))
        .route("/google/callback", get(google_callback))
}

/// routes mounted under `/api`
pub fn create_api_router(state: AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/admin", get(admin_panel))
        .route_layer(RoleLayer::admin());

    Router::new()
        .route("/profile", get(profile))
        .merge(admin)
        .route_layer(axum::middleware::from_fn_with_state(state, require_user))
}

fn oauth_state_cookie<'a>(value: String, max_age: time::Duration) -> Cookie<'a> {
    let mut cookie = Cookie::new(OAUTH_STATE_COOKIE_NAME, value);

    cookie.set_path("/auth");
    cookie.set_http_only(true);
    cookie.set_secure(!app_config().is_development);
    // must be sent on the redirect back from google
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(max_age);

    cookie
}

fn oauth_not_configured() -> (StatusCode, SimpleError) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        SimpleError::from(OAUTH_NOT_CONFIGURED),
    )
}

/// Redirects to the google sign in page
///
/// the CSRF state sent to google is kept on a short lived cookie and checked on the callback
#[utoipa::path(
    get,
    path = "/auth/google",
    tag = "auth",
    responses(
        (
            status = SEE_OTHER,
            description = "redirect to google",
            headers(("Set-Cookie" = String, description = "oauth state cookie"))
        ),
        (
            status = SERVICE_UNAVAILABLE,
            description = "OAUTH_NOT_CONFIGURED",
            body = SimpleError,
        ),
    ),
)]
pub async fn google_sign_in(
    State(state): State<AppState>,
) -> Result<(HeaderMap, Redirect), (StatusCode, SimpleError)> {
    let google = state.google.as_ref().ok_or_else(oauth_not_configured)?;

    let (url, csrf_state) = google.authorize_url();

    let cookie = oauth_state_cookie(csrf_state.secret().clone(), time::Duration::minutes(10));

    let mut headers = HeaderMap::new();
    headers.insert(
        SET_COOKIE,
        cookie_to_header_value(cookie).ok_or_else(|| internal_error_msg("invalid cookie"))?,
    );

    Ok((headers, Redirect::to(url.as_str())))
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GoogleCallbackQuery {
    code: String,
    state: String,
}

/// Google sign in callback
///
/// signs in the user of the google account, linking it by email to a existing user
/// or creating a new one, then redirects to the frontend dashboard
#[utoipa::path(
    get,
    path = "/auth/google/callback",
    tag = "auth",
    params(GoogleCallbackQuery),
    responses(
        (
            status = SEE_OTHER,
            description = "signed in, redirect to the frontend dashboard",
            headers(("Set-Cookie" = String, description = "new session id cookie"))
        ),
        (
            status = BAD_REQUEST,
            description = "INVALID_OAUTH_STATE",
            body = SimpleError,
        ),
        (
            status = SERVICE_UNAVAILABLE,
            description = "OAUTH_NOT_CONFIGURED",
            body = SimpleError,
        ),
    ),
)]
pub async fn google_callback(
    State(state): State<AppState>,
    SecureClientIp(client_ip): SecureClientIp,
    user_agent: Option<TypedHeader<UserAgent>>,
    req_headers: HeaderMap,
    Query(query): Query<GoogleCallbackQuery>,
) -> Result<Response, (StatusCode, SimpleError)> {
    let google = state.google.as_ref().ok_or_else(oauth_not_configured)?;

    let expected_state = get_cookie_from_request_headers(&req_headers, OAUTH_STATE_COOKIE_NAME);

    if expected_state.as_deref() != Some(query.state.as_str()) {
        return Err((
            StatusCode::BAD_REQUEST,
            SimpleError::from(INVALID_OAUTH_STATE),
        ));
    }

    let profile = google.fetch_profile(query.code).await.map_err(|e| {
        error!("[AUTH] google sign in failed: {e:#}");
        internal_error_msg("failed to sign in with google")
    })?;

    let user = state
        .auth_service
        .find_or_create_google_user(profile)
        .await
        .map_err(SimpleError::from)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e))?;

    let user_agent = user_agent
        .map(|TypedHeader(ua)| ua.as_str().to_string())
        .unwrap_or_default();

    let session_id = state
        .auth_service
        .new_session(user.id, client_ip, user_agent)
        .await
        .or(Err(internal_error_msg("failed to create session")))?;

    info!("[AUTH] user {} signed in with google", user.id);

    let mut headers = HeaderMap::new();

    let set_sid = session_id
        .into_set_cookie_header()
        .ok_or_else(|| internal_error_msg("invalid cookie"))?;

    let clear_state = cookie_to_header_value(oauth_state_cookie(
        String::new(),
        time::Duration::ZERO,
    ))
    .ok_or_else(|| internal_error_msg("invalid cookie"))?;

    headers.append(SET_COOKIE, set_sid);
    headers.append(SET_COOKIE, clear_state);

    let mut frontend = app_config().frontend_url.to_string();
    frontend.pop_if_is('/');

    Ok((headers, Redirect::to(&format!("{}/dashboard", frontend))).into_response())
}

/// Returns the request user
#[utoipa::path(
    get,
    path = "/api/profile",
    tag = "auth",
    security(("session_id" = []), ("bearer" = [])),
    responses(
        (status = OK, body = UserDto),
        (status = UNAUTHORIZED, body = SimpleError),
    ),
)]
pub async fn profile(Extension(req_user): Extension<RequestUser>) -> Json<UserDto> {
    Json(req_user.0)
}

/// Admin panel greeting, useful to check if the request user is a admin
#[utoipa::path(
    get,
    path = "/api/admin",
    tag = "auth",
    security(("session_id" = []), ("bearer" = [])),
    responses(
        (status = OK, body = MessageResponse),
        (status = FORBIDDEN, description = "MISSING_PERMISSIONS", body = SimpleError),
    ),
)]
pub async fn admin_panel() -> Json<MessageResponse> {
    Json(MessageResponse::from("Welcome to admin panel"))
}
