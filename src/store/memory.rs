//! In-memory store with an optional byte quota.

use std::collections::HashMap;

use super::{check_quota, entry_size, KeyValueStore};
use crate::error::StoreError;

// == Memory Store ==
/// `HashMap`-backed store. Not durable; used for tests and for running the
/// service without a data file.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    /// Maximum bytes across all keys and values, None = unlimited
    quota: Option<usize>,
    /// Bytes currently counted against the quota
    used: usize,
}

impl MemoryStore {
    /// Creates an unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that refuses writes beyond `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            quota: Some(quota_bytes),
            ..Self::default()
        }
    }

    /// Bytes currently used.
    pub fn used_bytes(&self) -> usize {
        self.used
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let previous = self.entries.get(key).map(String::as_str);
        self.used = check_quota(self.quota, self.used, key, previous, value)?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&mut self, key: &str) {
        if let Some(old) = self.entries.remove(key) {
            self.used -= entry_size(key, &old);
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}
