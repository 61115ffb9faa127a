//! JSON file store
//!
//! Keeps the whole map in memory and rewrites the file atomically on every
//! mutation, so entries survive a restart of the service.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{check_quota, entry_size, KeyValueStore};
use crate::error::StoreError;

// == File Store ==
/// Durable store persisted as a single JSON object.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: HashMap<String, String>,
    /// Maximum bytes across all keys and values, None = unlimited
    quota: Option<usize>,
    used: usize,
}

impl FileStore {
    // == Constructor ==
    /// Opens the store at `path`, loading existing entries.
    ///
    /// A missing or empty file opens as an empty store. A file that is not a
    /// JSON object of strings is rejected with `StoreError::Corrupt`.
    pub fn open(path: impl AsRef<Path>, quota: Option<usize>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = load_entries(&path)?;
        let used = entries.iter().map(|(k, v)| entry_size(k, v)).sum();

        debug!(
            "Opened file store at {} with {} keys ({} bytes)",
            path.display(),
            entries.len(),
            used
        );

        Ok(Self {
            path,
            entries,
            quota,
            used,
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes currently used.
    pub fn used_bytes(&self) -> usize {
        self.used
    }

    // == Persist ==
    /// Writes the map to a temp file and renames it over the store file.
    fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string(&self.entries)?;
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

fn load_entries(path: &Path) -> Result<HashMap<String, String>, StoreError> {
    if !path.exists() {
        return Ok(HashMap::new());
    }

    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(HashMap::new());
    }

    Ok(serde_json::from_str(&content)?)
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let previous = self.entries.get(key).map(String::as_str);
        let used_after = check_quota(self.quota, self.used, key, previous, value)?;

        let previous = self.entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.persist() {
            // Roll back so memory matches disk
            match previous {
                Some(old) => self.entries.insert(key.to_string(), old),
                None => self.entries.remove(key),
            };
            return Err(e);
        }

        self.used = used_after;
        Ok(())
    }

    fn delete(&mut self, key: &str) {
        if let Some(old) = self.entries.remove(key) {
            self.used -= entry_size(key, &old);
            if let Err(e) = self.persist() {
                warn!("Failed to persist delete of '{}': {}", key, e);
            }
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}
