//! Startup configuration discovery.
//!
//! Loads `.env` (if present) and then the TOML configuration from, in order:
//! the path in `OCEAN_CONFIG`, `./ocean.toml`, or built-in defaults.

use super::toml_config::{ConfigError, OceanConfig};
use std::env;
use std::path::PathBuf;

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "OCEAN_CONFIG";

const DEFAULT_CONFIG_FILE: &str = "ocean.toml";

/// Load configuration for process start.
///
/// An explicit `OCEAN_CONFIG` path that does not exist is an error; a missing
/// `./ocean.toml` is not.
pub fn load_config() -> Result<OceanConfig, ConfigError> {
    dotenvy::dotenv().ok();

    match config_path() {
        Some(path) => {
            tracing::info!("Loading configuration from {}", path.display());
            OceanConfig::load(path)
        }
        None => {
            tracing::info!("No {} found, using default configuration", DEFAULT_CONFIG_FILE);
            let config = OceanConfig::default();
            config.validate()?;
            Ok(config)
        }
    }
}

fn config_path() -> Option<PathBuf> {
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }

    let default = PathBuf::from(DEFAULT_CONFIG_FILE);
    default.exists().then_some(default)
}
