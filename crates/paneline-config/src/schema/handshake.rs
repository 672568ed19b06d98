use serde::{Deserialize, Serialize};

/// What the parent does with a second `ready` in the same open cycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RepeatReadyPolicy {
    /// Send `initialize` again with the latest payload (child reloaded).
    #[default]
    Resend,
    /// Drop the signal; the child keeps whatever it already has.
    Ignore,
}

/// Ready/initialize exchange settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HandshakeConfig {
    /// How long a child waits for its payload before showing a timeout
    /// state, in milliseconds (valid range: 100-120000).
    pub ready_timeout_ms: u32,
    pub repeat_ready: RepeatReadyPolicy,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            ready_timeout_ms: 10_000,
            repeat_ready: RepeatReadyPolicy::Resend,
        }
    }
}
