use serde::{Deserialize, Serialize};

/// Where oversized launch payloads are staged.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process map. Only useful when both sides share the process.
    #[default]
    Memory,
    /// One JSON file per session in a shared directory.
    File,
}

/// Staged payload store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Directory for the file backend. Empty means the platform data dir.
    pub directory: String,
    /// Entries older than this are reaped, in seconds (valid range: 10-86400).
    pub max_age_secs: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            directory: String::new(),
            max_age_secs: 300,
        }
    }
}
