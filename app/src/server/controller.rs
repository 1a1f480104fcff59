use super::open_api;
use crate::{
    config::app_config,
    modules::{
        admin_chat, ai,
        auth::{self, service::AuthService},
        booking, car, chatbot, contact, footer, user,
    },
    services::{google::GoogleOAuth, llm::LlmClient, s3::ObjectStore},
    utils::string::StringExt,
};
use axum::{body::Body, routing::get, Router};
use axum_client_ip::SecureClientIpSource;
use http::{header, HeaderValue, Method, Request, StatusCode};
use rand_chacha::ChaCha8Rng;
use rand_core::{OsRng, RngCore, SeedableRng};
use sea_orm::DatabaseConnection;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{warn, Level, Span};

/// The main application state, this is cloned for every HTTP request
/// and thus its fields should contain types that are cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub store: ObjectStore,
    pub llm: LlmClient,
    /// `None` when google sign in is not configured
    pub google: Option<GoogleOAuth>,
    /// client for outgoing requests that are not made by a dedicated service
    pub http: reqwest::Client,
    pub auth_service: AuthService,
}

/// Creates the main axum router/controller
pub fn new(
    db: DatabaseConnection,
    store: ObjectStore,
    llm: LlmClient,
    google: Option<GoogleOAuth>,
    http: reqwest::Client,
) -> Router {
    let rng = ChaCha8Rng::seed_from_u64(OsRng.next_u64());

    let state = AppState {
        db: db.clone(),
        store,
        llm,
        google,
        http,
        auth_service: AuthService::new(db, rng),
    };

    // URL.to_string for some reason adds a trailing slash
    // we need to remove it to avoid cors errors
    let mut frontend_origin = app_config().frontend_url.to_string();
    frontend_origin.pop_if_is('/');

    let mut cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::PUT,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_credentials(true)
        .allow_headers([header::ACCEPT, header::AUTHORIZATION, header::CONTENT_TYPE]);

    match frontend_origin.parse::<HeaderValue>() {
        Ok(origin) => cors = cors.allow_origin(origin),
        Err(_) => warn!("[WEB] invalid frontend url for CORS: {frontend_origin}"),
    }

    // extracts the client IP from the request, this is harder than it sounds and should be
    // done by a lib to deal with edge cases such as extracting the original IP from a header
    // set by cloudflare or other load balancers.
    let ip_extractor_layer = SecureClientIpSource::ConnectInfo.into_extension();

    let tracing_layer = TraceLayer::new_for_http()
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!("request: {} {}", request.method(), request.uri().path())
        })
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let global_middlewares = ServiceBuilder::new()
        .layer(ip_extractor_layer)
        .layer(tracing_layer)
        .layer(cors);

    // every module under /api is merged before nesting since axum
    // does not allow nesting twice at the same path
    let api = Router::new()
        .merge(car::routes::create_router(state.clone()))
        .merge(ai::routes::create_router(state.clone()))
        .merge(booking::routes::create_router(state.clone()))
        .merge(contact::routes::create_router(state.clone()))
        .merge(chatbot::routes::create_router(state.clone()))
        .merge(admin_chat::routes::create_router(state.clone()))
        .merge(footer::routes::create_router(state.clone()))
        .merge(auth::routes::create_api_router(state.clone()));

    Router::new()
        .merge(open_api::create_openapi_router())
        .route("/healthcheck", get(healthcheck))
        .nest("/api", api)
        .nest("/users", user::routes::create_router(state.clone()))
        .nest("/auth", auth::routes::create_router())
        .layer(global_middlewares)
        .with_state(state)
}

#[utoipa::path(
    get,
    tag = "meta",
    path = "/healthcheck",
    responses((status = OK)),
)]
pub async fn healthcheck() -> StatusCode {
    StatusCode::OK
}
