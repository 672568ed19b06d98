//! Configuration schema types for Paneline.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod dialog;
mod handshake;
mod store;
mod system;
mod transport;

pub use dialog::*;
pub use handshake::*;
pub use store::*;
pub use system::*;
pub use transport::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration for Paneline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelineConfig {
    pub transport: TransportConfig,
    pub dialog: DialogConfig,
    pub handshake: HandshakeConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}
