use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::{info, log};

/// creates the database connection pool
///
/// # PANICS
/// panics if the pool cannot be built, the API cannot run without its database
pub async fn connect(db_url: &str) -> DatabaseConnection {
    let mut opt = ConnectOptions::new(db_url);

    opt.max_connections(100)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(60))
        .max_lifetime(Duration::from_secs(60 * 30))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    info!("[DB] getting connection");
    Database::connect(opt)
        .await
        .unwrap_or_else(|e| panic!("[DB] failed to build connection pool: {e}"))
}

/// Apply all pending migrations
///
/// # PANICS
/// panics if any migration fails
pub async fn run_migrations(db: &DatabaseConnection) {
    info!("[DB] running migrations");
    Migrator::up(db, None)
        .await
        .unwrap_or_else(|e| panic!("[DB] failed to run migrations: {e}"));
}
