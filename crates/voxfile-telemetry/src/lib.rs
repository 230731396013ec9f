//! Logging setup for voxfile
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and either a
//! human readable or a JSON formatter.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use voxfile_config::{LogFormat, TelemetryConfig};

/// Initialize logging from configuration
///
/// The filter is taken from `override_filter` if given, then `RUST_LOG`,
/// then the configured `log_filter`. Logs go to stderr so stdout stays free
/// for command output.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
pub fn init(config: &TelemetryConfig, override_filter: Option<&str>) -> anyhow::Result<()> {
    let filter = resolve_filter(config, override_filter);

    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    tracing::debug!(format = ?config.format, "logging initialized");

    Ok(())
}

fn resolve_filter(config: &TelemetryConfig, override_filter: Option<&str>) -> EnvFilter {
    if let Some(directive) = override_filter {
        return EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"));
    }

    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
