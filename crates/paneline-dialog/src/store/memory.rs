use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use paneline_common::SessionId;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::lock;

use super::PayloadStore;

struct StagedPayload {
    json: String,
    staged_at: Instant,
}

/// In-process payload store. Clones share the same entries.
#[derive(Clone, Default)]
pub struct MemoryPayloadStore {
    entries: Arc<Mutex<HashMap<SessionId, StagedPayload>>>,
}

impl MemoryPayloadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a staged payload without consuming it.
    pub fn peek(&self, id: &SessionId) -> Option<String> {
        lock(&self.entries).get(id).map(|entry| entry.json.clone())
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        lock(&self.entries).contains_key(id)
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }
}

impl PayloadStore for MemoryPayloadStore {
    fn put(&self, payload: &str) -> Result<SessionId, StoreError> {
        let id = SessionId::new();
        lock(&self.entries).insert(
            id.clone(),
            StagedPayload {
                json: payload.to_string(),
                staged_at: Instant::now(),
            },
        );
        debug!(session_id = %id, bytes = payload.len(), "payload staged in memory");
        Ok(id)
    }

    fn take(&self, id: &SessionId) -> Result<Option<String>, StoreError> {
        Ok(lock(&self.entries).remove(id).map(|entry| entry.json))
    }

    fn discard(&self, id: &SessionId) -> Result<bool, StoreError> {
        Ok(lock(&self.entries).remove(id).is_some())
    }

    fn reap_stale(&self, max_age: Duration) -> Result<usize, StoreError> {
        let mut entries = lock(&self.entries);
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|id, entry| {
            let stale = now.duration_since(entry.staged_at) > max_age;
            if stale {
                info!(session_id = %id, "reaping stale staged payload");
            }
            !stale
        });
        Ok(before - entries.len())
    }
}
