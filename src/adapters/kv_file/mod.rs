// JSON file key-value adapter - Persists application state between runs

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::{debug, warn};

use crate::domain::errors::*;
use crate::error::MarkCutResult;
use crate::ports::*;

/// Key-value store backed by a single JSON object on disk.
///
/// Every write rewrites the whole file through a temporary file in the same
/// directory, so a crash never leaves a half-written state file behind. The
/// in-memory map only changes once the file has been written.
#[derive(Debug)]
pub struct JsonFileKeyValueStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl JsonFileKeyValueStore {
    /// Open the store at `path`; a missing file starts empty
    pub fn open(path: impl Into<PathBuf>) -> MarkCutResult<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let content = fs::read_to_string(&path)?;
            match serde_json::from_str::<BTreeMap<String, String>>(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Ignoring unreadable state file");
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        debug!(path = %path.display(), keys = entries.len(), "Opened state file");
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), DomainError> {
        let storage_error = |e: String| DomainError::Storage(format!("{}: {}", self.path.display(), e));

        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(|e| storage_error(e.to_string()))?;

        let content = serde_json::to_string_pretty(entries).map_err(|e| storage_error(e.to_string()))?;
        let mut temp = tempfile::NamedTempFile::new_in(&parent).map_err(|e| storage_error(e.to_string()))?;
        temp.write_all(content.as_bytes())
            .map_err(|e| storage_error(e.to_string()))?;
        temp.persist(&self.path).map_err(|e| storage_error(e.error.to_string()))?;
        Ok(())
    }
}

fn poisoned() -> DomainError {
    DomainError::Storage("state file lock poisoned".to_string())
}

impl KeyValuePort for JsonFileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DomainError> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        let mut candidate = entries.clone();
        candidate.insert(key.to_string(), value.to_string());
        self.persist(&candidate)?;
        *entries = candidate;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), DomainError> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut candidate = entries.clone();
        candidate.remove(key);
        self.persist(&candidate)?;
        *entries = candidate;
        Ok(())
    }
}
