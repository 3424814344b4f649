//! Configuration and process-level utilities.

/// Startup configuration discovery (`.env`, `OCEAN_CONFIG`, `ocean.toml`).
pub mod config;
/// Tracing subscriber setup.
pub mod telemetry;
/// TOML configuration model and validation.
pub mod toml_config;

pub use config::load_config;
pub use toml_config::{ConfigError, OceanConfig};
