//! `paneline stage`: encode a payload file into a launch URL.

use std::path::Path;

use paneline_common::PanelineError;
use paneline_config::schema::{PanelineConfig, StoreBackend};
use paneline_dialog::{LaunchEncoding, LaunchTarget, TransportSelector};
use serde_json::Value;
use tracing::{info, warn};

pub fn run(config: &PanelineConfig, view: &str, file: &Path) -> Result<LaunchTarget, PanelineError> {
    let raw = std::fs::read_to_string(file)?;
    let payload: Value = serde_json::from_str(&raw)?;

    let store = super::open_store(config)?;
    let selector = TransportSelector::from_config(&config.transport);
    let target = selector
        .stage(view, &payload, store.as_ref())
        .map_err(|e| PanelineError::Dialog(e.to_string()))?;

    if let LaunchEncoding::Session(id) = &target.encoding {
        if config.store.backend == StoreBackend::Memory {
            warn!(session_id = %id, "payload staged in memory; it is gone once this process exits");
        }
    }
    info!(view, file = %file.display(), encoding = %target.encoding, "payload staged");
    Ok(target)
}
