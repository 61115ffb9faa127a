//! MRU Ledger Module
//!
//! Recency ordering of cached keys, persisted in the backing store.

use tracing::warn;

use crate::error::StoreError;
use crate::store::KeyValueStore;

// == MRU Ledger ==
/// Ordered list of cache keys by recency of use.
///
/// Keys are stored in a Vec where:
/// - Front = Least recently used
/// - Back = Most recently used
///
/// The ledger holds no duplicates. It is serialized as a JSON array of
/// strings under a reserved key in the same store as the entries.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MruLedger {
    order: Vec<String>,
}

impl MruLedger {
    // == Constructor ==
    /// Creates a new empty ledger.
    pub fn new() -> Self {
        Self { order: Vec::new() }
    }

    // == Load ==
    /// Reads the ledger stored under `ledger_key`.
    ///
    /// A missing ledger is empty. A ledger that fails to parse is logged and
    /// also treated as empty; later writes overwrite it.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S, ledger_key: &str) -> Self {
        let Some(raw) = store.read(ledger_key) else {
            return Self::new();
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(keys) => Self::from_keys(keys),
            Err(e) => {
                warn!("Discarding unreadable MRU ledger '{}': {}", ledger_key, e);
                Self::new()
            }
        }
    }

    /// Builds a ledger from keys ordered oldest first, dropping repeats.
    ///
    /// When a key appears more than once its last position wins.
    pub fn from_keys(keys: Vec<String>) -> Self {
        let mut ledger = Self::new();
        for key in keys {
            ledger.touch(&key);
        }
        ledger
    }

    // == Save ==
    /// Writes the ledger under `ledger_key`.
    pub fn save<S: KeyValueStore + ?Sized>(
        &self,
        store: &mut S,
        ledger_key: &str,
    ) -> Result<(), StoreError> {
        let raw = serde_json::to_string(&self.order)?;
        store.write(ledger_key, &raw)
    }

    // == Touch ==
    /// Marks a key as most recently used (moves to back).
    pub fn touch(&mut self, key: &str) {
        self.remove(key);
        self.order.push(key.to_string());
    }

    // == Remove ==
    /// Removes a key from the ledger. Returns true if it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.order.iter().position(|k| k == key) {
            Some(index) => {
                self.order.remove(index);
                true
            }
            None => false,
        }
    }

    // == Drain Oldest ==
    /// Removes and returns up to `count` least recently used keys, oldest first.
    pub fn drain_oldest(&mut self, count: usize) -> Vec<String> {
        let count = count.min(self.order.len());
        self.order.drain(..count).collect()
    }

    /// Returns the least recently used key.
    pub fn oldest(&self) -> Option<&str> {
        self.order.first().map(String::as_str)
    }

    /// Returns the most recently used key.
    pub fn newest(&self) -> Option<&str> {
        self.order.last().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.order.iter().any(|k| k == key)
    }

    /// Keys ordered oldest first.
    pub fn keys(&self) -> &[String] {
        &self.order
    }

    pub fn into_keys(self) -> Vec<String> {
        self.order
    }
}
