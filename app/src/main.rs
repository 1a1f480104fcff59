use dealership::{
    config::app_config,
    cronjobs, database, server,
    services::{google::GoogleOAuth, llm::LlmClient, s3::ObjectStore},
    tracer,
};
use signal_hook::{
    consts::{SIGINT, SIGTERM},
    iterator::Signals,
};
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};
use tracing::{error, info};

#[tokio::main]
#[allow(clippy::never_loop)]
pub async fn main() {
    let cfg = app_config();

    tracer::init("dealership_api", cfg.is_development).expect("failed to init tracer");

    let db = database::db::connect(&cfg.db_url).await;

    database::db::run_migrations(&db).await;

    cronjobs::start_clear_sessions_cronjob(db.clone(), Duration::from_secs(5 * 60));

    let mut signals = Signals::new([SIGINT, SIGTERM]).expect("failed to setup signals hook");

    let db_conn_pool_shutdown_ref = db.clone();

    tokio::spawn(async move {
        for sig in signals.forever() {
            if !cfg.is_development {
                info!("[APP] received signal: {}, shutting down", sig);

                info!("[APP] closing database connections");
                if let Err(e) = db_conn_pool_shutdown_ref.close().await {
                    error!("[DB] failed to close db connection: {e}")
                }
            }

            std::process::exit(sig)
        }
    });

    let store = ObjectStore::new().await;

    cronjobs::start_orphan_images_cronjob(
        db.clone(),
        store.clone(),
        Duration::from_secs(60 * 60),
        chrono::Duration::minutes(cfg.orphan_image_grace_minutes),
    );

    let http = reqwest::Client::new();

    let llm = LlmClient::from_config(http.clone());

    // the token exchange must not follow redirects
    let oauth_http = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("failed to build the oauth http client");

    let google = GoogleOAuth::from_config(oauth_http).expect("invalid google oauth config");

    if google.is_none() {
        info!("[AUTH] google sign in is disabled");
    }

    if !llm.is_enabled() {
        info!("[LLM] OPENAI_API_KEY not set, AI features are disabled");
    }

    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), cfg.http_port);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("[WEB] failed to bind {addr}: {e}"));

    info!("[WEB] listening on {}", addr);

    let router = server::controller::new(db, store, llm, google, http);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("[WEB] server error");
}
