//! Out-of-band store for launch payloads too large to inline in a URL.
//!
//! The parent stages a serialized payload and passes only the returned
//! session id to the child, which takes (reads and removes) it while
//! initializing. Ids are single-use.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use paneline_common::SessionId;
use paneline_config::schema::{StoreBackend, StoreConfig};

use crate::error::StoreError;

mod file;
mod memory;

pub use file::FilePayloadStore;
pub use memory::MemoryPayloadStore;

/// Keyed store shared by the parent (writer) and a child (reader).
pub trait PayloadStore: Send + Sync {
    /// Stage a serialized payload under a fresh session id.
    fn put(&self, payload: &str) -> Result<SessionId, StoreError>;

    /// Read and remove a staged payload. `Ok(None)` if the id is unknown
    /// or was already taken.
    fn take(&self, id: &SessionId) -> Result<Option<String>, StoreError>;

    /// Drop a staged payload without reading it. Returns whether it existed.
    fn discard(&self, id: &SessionId) -> Result<bool, StoreError>;

    /// Remove entries staged longer than `max_age` ago. Returns the count.
    fn reap_stale(&self, max_age: Duration) -> Result<usize, StoreError>;
}

/// Build the store selected by configuration.
pub fn from_config(config: &StoreConfig) -> Result<Arc<dyn PayloadStore>, StoreError> {
    match config.backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryPayloadStore::new())),
        StoreBackend::File => {
            let dir = if config.directory.trim().is_empty() {
                FilePayloadStore::default_dir()?
            } else {
                PathBuf::from(config.directory.trim())
            };
            Ok(Arc::new(FilePayloadStore::new(dir)))
        }
    }
}
