//! Paneline configuration system.
//!
//! TOML-based configuration for the dialog core: launch transport, dialog
//! sizing, handshake policy, staged payload storage and logging. All
//! sections use serde defaults so partial configs work out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use paneline_config::{config_to_json, load_config};
//!
//! let config = load_config().expect("failed to load config");
//! println!("{}", config_to_json(&config));
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{PanelineConfig, CONFIG_SCHEMA_VERSION};
pub use toml_loader::{load_default, load_from_path};

use paneline_common::ConfigError;

/// Load config from the platform default path and validate it strictly.
///
/// Creates a documented default `config.toml` if none exists yet.
pub fn load_config() -> Result<PanelineConfig, ConfigError> {
    let config = toml_loader::load_default()?;
    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &PanelineConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
