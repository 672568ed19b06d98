//! Subcommand implementations.

pub mod demo;
pub mod stage;

use std::sync::Arc;

use paneline_common::PanelineError;
use paneline_config::schema::PanelineConfig;
use paneline_dialog::PayloadStore;

/// Build the payload store selected by configuration.
pub fn open_store(config: &PanelineConfig) -> Result<Arc<dyn PayloadStore>, PanelineError> {
    paneline_dialog::store::from_config(&config.store)
        .map_err(|e| PanelineError::Dialog(format!("payload store unavailable: {e}")))
}
