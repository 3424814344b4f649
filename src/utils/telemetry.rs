//! Tracing subscriber setup.

use super::toml_config::LoggingConfig;
use crate::types::{AppError, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Dependency targets that are too chatty at `info`.
const QUIET_TARGETS: &[&str] = &["hyper=warn", "reqwest=warn", "ort=warn", "h2=warn"];

/// Build the filter directive string for a base level.
pub fn filter_directives(level: &str) -> String {
    let mut directives = vec![level.to_string()];
    directives.extend(QUIET_TARGETS.iter().map(|d| d.to_string()));
    directives.join(",")
}

/// Install the global subscriber. `RUST_LOG` takes precedence over the config.
///
/// # Errors
///
/// Fails if a global subscriber is already installed or the level is invalid.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(filter_directives(&config.level))
            .map_err(|e| AppError::Configuration(format!("Invalid log level: {}", e)))?,
    };

    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };

    result.map_err(|e| AppError::Internal(format!("Failed to install tracing subscriber: {}", e)))
}
