use std::fs::DirEntry;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use paneline_common::SessionId;
use tracing::{debug, info, warn};

use crate::error::StoreError;

use super::PayloadStore;

/// Payload store backed by one `<session id>.json` file per entry, so a
/// parent and a child running in separate processes can share it.
#[derive(Debug, Clone)]
pub struct FilePayloadStore {
    dir: PathBuf,
}

impl FilePayloadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<data dir>/paneline/staged` for the current platform.
    pub fn default_dir() -> Result<PathBuf, StoreError> {
        let base = dirs::data_local_dir()
            .ok_or_else(|| StoreError::Unavailable("could not determine data directory".into()))?;
        Ok(base.join("paneline").join("staged"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path for an id, or `None` if the id could escape the directory.
    ///
    /// Ids arrive from launch URLs, so only UUID-shaped names are accepted.
    fn entry_path(&self, id: &SessionId) -> Option<PathBuf> {
        let raw = id.as_str();
        let safe = !raw.is_empty()
            && raw.len() <= 64
            && raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !safe {
            warn!(session_id = %id, "rejecting malformed session id");
            return None;
        }
        Some(self.dir.join(format!("{raw}.json")))
    }
}

impl PayloadStore for FilePayloadStore {
    fn put(&self, payload: &str) -> Result<SessionId, StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        let id = SessionId::new();
        let path = self
            .entry_path(&id)
            .ok_or_else(|| StoreError::Unavailable(format!("unusable session id {id}")))?;

        // Write then rename so a reader never sees a partial file.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, payload)?;
        std::fs::rename(&tmp, &path)?;

        debug!(session_id = %id, bytes = payload.len(), path = %path.display(), "payload staged on disk");
        Ok(id)
    }

    fn take(&self, id: &SessionId) -> Result<Option<String>, StoreError> {
        let Some(path) = self.entry_path(id) else {
            return Ok(None);
        };
        let payload = match std::fs::read_to_string(&path) {
            Ok(payload) => payload,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if let Err(e) = std::fs::remove_file(&path) {
            if e.kind() != ErrorKind::NotFound {
                warn!(session_id = %id, error = %e, "failed to remove taken payload");
            }
        }
        Ok(Some(payload))
    }

    fn discard(&self, id: &SessionId) -> Result<bool, StoreError> {
        let Some(path) = self.entry_path(id) else {
            return Ok(false);
        };
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn reap_stale(&self, max_age: Duration) -> Result<usize, StoreError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let now = SystemTime::now();
        let mut reaped = 0;
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if !is_staged_file(&path) {
                continue;
            }
            // A child may take the entry between listing and stat.
            let Some(modified) = modified_at(&entry)? else {
                continue;
            };
            let age = now.duration_since(modified).unwrap_or_default();
            if age > max_age {
                match std::fs::remove_file(&path) {
                    Ok(()) => {
                        info!(path = %path.display(), "reaping stale staged payload");
                        reaped += 1;
                    }
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(e) => return Err(e.into()),
                }
            }
        }
        Ok(reaped)
    }
}

/// Entries and the temporaries `put` leaves behind if it dies mid-write.
fn is_staged_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(".json") || name.ends_with(".json.tmp"))
}

/// Modification time of a listed entry, or `None` if it is already gone.
fn modified_at(entry: &DirEntry) -> Result<Option<SystemTime>, StoreError> {
    match entry.metadata().and_then(|meta| meta.modified()) {
        Ok(modified) => Ok(Some(modified)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
