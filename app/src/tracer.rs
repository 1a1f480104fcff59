use tracing_subscriber::{fmt, EnvFilter};

/// installs the global tracing subscriber, printing to stdout.
///
/// the log level can be set with the `RUST_LOG` env var, when not set defaults
/// to `debug` in development and `info` otherwise.
pub fn init(
    service_name: &str,
    is_development: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let default_level = if is_development { "debug" } else { "info" };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()?;

    tracing::info!("[TRACER] initialized for {}", service_name);
    Ok(())
}
