//! JSON-file key/value persistence
//!
//! Implements the [`KeyValueStore`] port as a single JSON object on disk -
//! the analog of a small preference store, not a database. Writes go through
//! a temp file plus rename so a crash mid-write cannot corrupt the store.
//! Concurrent access is serialized with an internal mutex; cross-process
//! coordination is out of scope (one SDK instance per process).

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use nudgekit_core::KeyValueStore;
use nudgekit_domain::StorageError;
use parking_lot::Mutex;
use tracing::debug;

/// File-backed string key/value store.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Create a store over the given file path. The file is created lazily
    /// on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(err) => Err(StorageError::Persistence(err.to_string())),
        }
    }

    fn persist(&self, values: &HashMap<String, String>) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(values)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, encoded).map_err(|e| StorageError::Persistence(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| StorageError::Persistence(e.to_string()))?;
        debug!(path = %self.path.display(), "Persisted key/value store");
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock();
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock();
        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());
        self.persist(&values)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock();
        let mut values = self.load()?;
        if values.remove(key).is_some() {
            self.persist(&values)?;
        }
        Ok(())
    }
}
