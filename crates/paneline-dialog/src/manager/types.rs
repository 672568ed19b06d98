use std::fmt;

use paneline_config::schema::DialogConfig;

/// Geometry and hosting hints passed to the platform when opening a child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogOptions {
    /// Height as a percentage of the host display (1..=100).
    pub height_percent: u32,
    /// Width as a percentage of the host display (1..=100).
    pub width_percent: u32,
    /// Host the child inline instead of in a separate window, where the
    /// platform supports it.
    pub display_in_iframe: bool,
}

impl DialogOptions {
    pub fn from_config(config: &DialogConfig) -> Self {
        Self {
            height_percent: config.height_percent.clamp(1, 100),
            width_percent: config.width_percent.clamp(1, 100),
            display_in_iframe: config.display_in_iframe,
        }
    }
}

impl Default for DialogOptions {
    fn default() -> Self {
        Self::from_config(&DialogConfig::default())
    }
}

/// Observable state of the single child slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    Closed,
    /// A platform open call is in flight.
    Opening,
    Open,
}

impl fmt::Display for DialogState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialogState::Closed => f.write_str("closed"),
            DialogState::Opening => f.write_str("opening"),
            DialogState::Open => f.write_str("open"),
        }
    }
}
