use serde::{Deserialize, Serialize};

/// Child window size and display mode handed to the platform open call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogConfig {
    /// Height as a percentage of the screen (valid range: 1-100).
    pub height_percent: u32,
    /// Width as a percentage of the screen (valid range: 1-100).
    pub width_percent: u32,
    /// Host the dialog in an iframe instead of a separate window.
    pub display_in_iframe: bool,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            height_percent: 60,
            width_percent: 40,
            display_in_iframe: false,
        }
    }
}
