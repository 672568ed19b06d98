use std::path::{Path, PathBuf};

use paneline_common::ConfigError;
use tracing::info;

use super::template::default_config_toml;

/// `<platform config dir>/paneline/config.toml`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("paneline").join("config.toml"))
        .ok_or_else(|| ConfigError::ParseError("no platform config directory".into()))
}

/// Write the documented default config to `path`, creating parent
/// directories as needed. Overwrites an existing file.
pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
    let write = || -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, default_config_toml())
    };
    write().map_err(|e| {
        ConfigError::ParseError(format!("cannot write default config {}: {e}", path.display()))
    })?;

    info!(path = %path.display(), "default config written");
    Ok(())
}
