//! Store Module
//!
//! Synchronous string key-value stores backing the poster cache.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::StoreError;

// == Key Value Store ==
/// Durable string key-value store.
///
/// Mirrors the browser storage contract: reads never fail, writes may be
/// refused when the store is full, deletes of absent keys are no-ops.
pub trait KeyValueStore {
    /// Reads the value stored under `key`.
    fn read(&self, key: &str) -> Option<String>;

    /// Writes `value` under `key`, replacing any previous value.
    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes `key` from the store.
    fn delete(&mut self, key: &str);

    /// Number of keys currently stored, including the cache's own ledger.
    fn len(&self) -> usize;

    /// All stored keys, in no particular order.
    fn keys(&self) -> Vec<String>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn read(&self, key: &str) -> Option<String> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).write(key, value)
    }

    fn delete(&mut self, key: &str) {
        (**self).delete(key)
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn keys(&self) -> Vec<String> {
        (**self).keys()
    }
}

// == Quota Accounting ==
/// Bytes a stored pair occupies against a quota.
pub(crate) fn entry_size(key: &str, value: &str) -> usize {
    key.len() + value.len()
}

/// Checks that replacing `previous` with `value` under `key` fits in `quota`.
///
/// Writes that do not grow usage always pass, so a store opened over its
/// quota can still shrink.
pub(crate) fn check_quota(
    quota: Option<usize>,
    used: usize,
    key: &str,
    previous: Option<&str>,
    value: &str,
) -> Result<usize, StoreError> {
    let freed = previous.map(|p| entry_size(key, p)).unwrap_or(0);
    let needed = entry_size(key, value);
    let used_after = used - freed + needed;

    match quota {
        Some(limit) if used_after > limit && used_after > used => Err(StoreError::QuotaExceeded {
            needed,
            available: limit.saturating_sub(used - freed),
        }),
        _ => Ok(used_after),
    }
}
