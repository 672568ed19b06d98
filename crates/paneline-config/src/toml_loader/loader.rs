//! Reading `config.toml` from an explicit path or the platform default.

use std::io::ErrorKind;
use std::path::Path;

use paneline_common::ConfigError;
use tracing::{debug, info, warn};

use crate::schema::PanelineConfig;
use crate::validation;

use super::paths::{create_default_config, default_config_path};

/// Parse the TOML file at `path`. Missing keys take their defaults.
///
/// Validation problems are only logged here; callers that must reject an
/// invalid config run [`validation::validate`] themselves.
pub fn load_from_path(path: &Path) -> Result<PanelineConfig, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ConfigError::FileNotFound(path.to_path_buf()))
        }
        Err(e) => {
            return Err(ConfigError::ParseError(format!(
                "cannot read {}: {e}",
                path.display()
            )))
        }
    };

    let config: PanelineConfig = toml::from_str(&content).map_err(|e| {
        ConfigError::ParseError(format!("invalid TOML in {}: {e}", path.display()))
    })?;

    if let Err(e) = validation::validate(&config) {
        warn!(path = %path.display(), "config has invalid values: {e}");
    }

    debug!(path = %path.display(), "config loaded");
    Ok(config)
}

/// Load `paneline/config.toml` under the platform config directory,
/// writing a commented default file first if there is none.
pub fn load_default() -> Result<PanelineConfig, ConfigError> {
    let path = default_config_path()?;
    match load_from_path(&path) {
        Err(ConfigError::FileNotFound(_)) => {
            info!(path = %path.display(), "no config file yet; writing defaults");
            create_default_config(&path)?;
            Ok(PanelineConfig::default())
        }
        other => other,
    }
}
