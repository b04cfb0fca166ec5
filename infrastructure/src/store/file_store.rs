//! File-backed thread identity store.
//!
//! State lives in a small JSON object so that other client-scoped keys can
//! share the file:
//!
//! ```json
//! {"threadId": "t1"}
//! ```
//!
//! Writes go to a sibling temp file which is then renamed over the original.

use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use threadline_application::{StoreError, ThreadIdentityStore};
use threadline_domain::ThreadId;
use tracing::{debug, warn};

/// Thread identity store persisted as a JSON file.
#[derive(Debug, Clone)]
pub struct FileThreadStore {
    path: PathBuf,
    key: String,
}

impl FileThreadStore {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_state(&self) -> Result<Map<String, Value>, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(StoreError::Io(format!("{}: {}", self.path.display(), e)));
            }
        };

        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(StoreError::Corrupt(format!(
                "{}: expected a JSON object",
                self.path.display()
            ))),
            Err(e) => Err(StoreError::Corrupt(format!("{}: {}", self.path.display(), e))),
        }
    }

    /// Read the state for a write, starting over if the file is unreadable JSON.
    fn read_state_for_update(&self) -> Result<Map<String, Value>, StoreError> {
        match self.read_state() {
            Err(StoreError::Corrupt(reason)) => {
                warn!("Replacing corrupt state file ({})", reason);
                Ok(Map::new())
            }
            other => other,
        }
    }

    fn write_state(&self, state: &Map<String, Value>) -> Result<(), StoreError> {
        let io_err = |e: std::io::Error| StoreError::Io(format!("{}: {}", self.path.display(), e));

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let content = serde_json::to_string_pretty(state)
            .map_err(|e| StoreError::Io(format!("serialize state: {}", e)))?;
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, content).map_err(io_err)?;
        std::fs::rename(&tmp_path, &self.path).map_err(io_err)?;
        Ok(())
    }
}

impl ThreadIdentityStore for FileThreadStore {
    fn load(&self) -> Result<Option<ThreadId>, StoreError> {
        let state = self.read_state()?;
        match state.get(&self.key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(id)) => ThreadId::new(id.as_str())
                .map(Some)
                .map_err(|e| StoreError::Corrupt(e.to_string())),
            Some(other) => Err(StoreError::Corrupt(format!(
                "'{}' is not a string: {}",
                self.key, other
            ))),
        }
    }

    fn save(&self, id: &ThreadId) -> Result<(), StoreError> {
        let mut state = self.read_state_for_update()?;
        if state.get(&self.key).and_then(Value::as_str) == Some(id.as_str()) {
            return Ok(());
        }
        state.insert(self.key.clone(), Value::String(id.to_string()));
        self.write_state(&state)?;
        debug!("Saved thread id {} to {}", id, self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut state = self.read_state_for_update()?;
        if state.remove(&self.key).is_none() {
            return Ok(());
        }
        self.write_state(&state)?;
        debug!("Cleared thread id in {}", self.path.display());
        Ok(())
    }
}
