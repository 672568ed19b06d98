use serde::{Deserialize, Serialize};

/// How launch payloads reach a child window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Page the child window is opened on. Query parameters are appended.
    pub base_url: String,
    /// Largest serialized payload (bytes) still inlined into the URL
    /// (valid range: 256-65536). Anything larger is staged in the store.
    pub inline_threshold: u32,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: "https://localhost:3000/dialog.html".into(),
            inline_threshold: 2048,
        }
    }
}
