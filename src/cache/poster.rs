//! Poster Cache Module
//!
//! Bounded cache over a durable key-value store. Recency is tracked in an
//! MRU ledger kept in the same store; the ledger is re-read on every
//! operation so nothing but counters lives in memory.

use serde::Serialize;
use tracing::{debug, error, warn};

use crate::cache::{CacheStats, MruLedger, DEFAULT_LEDGER_KEY};
use crate::error::StoreError;
use crate::store::KeyValueStore;

/// Share of the ledger dropped when the store reports it is full.
const EMERGENCY_EVICTION_RATIO: f64 = 0.1;

// == Set Outcome ==
/// What happened to a value handed to [`PosterCache::set`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SetOutcome {
    /// Stored on the first attempt
    Stored,
    /// Stored after the store was full and old entries were dropped
    StoredAfterEviction,
    /// Still did not fit after emergency eviction; not cached
    Dropped,
    /// The key collides with the ledger key
    Rejected,
}

impl SetOutcome {
    pub fn is_stored(self) -> bool {
        matches!(self, SetOutcome::Stored | SetOutcome::StoredAfterEviction)
    }
}

/// Number of entries removed by an emergency eviction of a ledger of `len`.
pub fn emergency_eviction_count(len: usize) -> usize {
    let tenth = (len as f64 * EMERGENCY_EVICTION_RATIO).floor() as usize;
    tenth.max(1).min(len)
}

// == Poster Cache ==
/// Bounded persistent cache with most-recently-used eviction.
#[derive(Debug)]
pub struct PosterCache<S> {
    /// Backing store holding entries and the ledger
    store: S,
    /// Maximum number of tracked keys
    capacity: usize,
    /// Reserved key the ledger is stored under
    ledger_key: String,
    stats: CacheStats,
}

impl<S: KeyValueStore> PosterCache<S> {
    // == Constructor ==
    /// Creates a cache over `store` holding at most `capacity` entries.
    ///
    /// A capacity of zero is raised to one so the newest entry always survives
    /// the capacity pass.
    pub fn new(store: S, capacity: usize) -> Self {
        Self {
            store,
            capacity: capacity.max(1),
            ledger_key: DEFAULT_LEDGER_KEY.to_string(),
            stats: CacheStats::new(),
        }
    }

    /// Stores the ledger under `ledger_key` instead of the default.
    pub fn with_ledger_key(mut self, ledger_key: impl Into<String>) -> Self {
        self.ledger_key = ledger_key.into();
        self
    }

    // == Get ==
    /// Looks up `key`, promoting it to most recently used on a hit.
    pub fn get(&mut self, key: &str) -> Option<String> {
        if key == self.ledger_key {
            self.stats.record_miss();
            return None;
        }

        match self.store.read(key) {
            Some(value) => {
                if let Err(e) = self.update_recency(key) {
                    warn!("Could not record use of '{}': {}", key, e);
                }
                self.stats.record_hit();
                Some(value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Set ==
    /// Stores `value` under `key` and enforces the capacity bound.
    ///
    /// If the store is full, the oldest tenth of the ledger is evicted and the
    /// write is retried once. Failures are logged and reported through the
    /// returned [`SetOutcome`]; they never propagate as errors.
    pub fn set(&mut self, key: &str, value: &str) -> SetOutcome {
        if key == self.ledger_key {
            warn!("Refusing to overwrite the MRU ledger key '{}'", key);
            return SetOutcome::Rejected;
        }

        let first_attempt = self
            .store
            .write(key, value)
            .and_then(|()| self.update_recency(key))
            .and_then(|()| self.evict(false).map(|_| ()));

        let Err(e) = first_attempt else {
            return SetOutcome::Stored;
        };

        if e.is_quota_exceeded() {
            warn!("Store full writing '{}', evicting to make room: {}", key, e);
        } else {
            warn!("Failed to store '{}', evicting and retrying: {}", key, e);
        }
        if let Err(e) = self.evict(true) {
            warn!("Emergency eviction could not persist the ledger: {}", e);
        }

        let retry = self
            .store
            .write(key, value)
            .and_then(|()| self.update_recency(key));

        match retry {
            Ok(()) => SetOutcome::StoredAfterEviction,
            Err(e) => {
                error!("Still failed to store '{}' after eviction: {}", key, e);
                self.discard_untracked(key);
                self.stats.record_dropped_write();
                SetOutcome::Dropped
            }
        }
    }

    // == Update Recency ==
    /// Moves `key` to the most recently used end of the ledger.
    fn update_recency(&mut self, key: &str) -> Result<(), StoreError> {
        let mut ledger = self.ledger();
        ledger.touch(key);
        ledger.save(&mut self.store, &self.ledger_key)
    }

    // == Evict ==
    /// Removes the oldest entries and returns how many were removed.
    ///
    /// With `force`, drops `max(1, floor(len / 10))` entries regardless of
    /// capacity; otherwise only enough to bring the ledger within capacity.
    fn evict(&mut self, force: bool) -> Result<usize, StoreError> {
        let mut ledger = self.ledger();
        let count = if force {
            emergency_eviction_count(ledger.len())
        } else {
            ledger.len().saturating_sub(self.capacity)
        };

        if count == 0 {
            return Ok(0);
        }

        let evicted = ledger.drain_oldest(count);
        for key in &evicted {
            self.store.delete(key);
        }
        debug!(
            "Evicted {} entries ({}): {:?}",
            evicted.len(),
            if force { "store full" } else { "over capacity" },
            evicted
        );

        if force {
            self.stats.record_emergency_evictions(evicted.len());
        } else {
            self.stats.record_evictions(evicted.len());
        }

        ledger.save(&mut self.store, &self.ledger_key)?;
        Ok(evicted.len())
    }

    /// Deletes a value that was written but never made it into the ledger.
    fn discard_untracked(&mut self, key: &str) {
        if !self.ledger().contains(key) {
            self.store.delete(key);
        }
    }

    // == Inspection ==
    /// Current ledger, oldest first.
    pub fn ledger(&self) -> MruLedger {
        MruLedger::load(&self.store, &self.ledger_key)
    }

    /// Number of tracked entries.
    pub fn len(&self) -> usize {
        self.ledger().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ledger_key(&self) -> &str {
        &self.ledger_key
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.len());
        stats
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    /// Store that fails a configurable number of writes to entry keys.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        failing_writes: usize,
    }

    impl KeyValueStore for FlakyStore {
        fn read(&self, key: &str) -> Option<String> {
            self.inner.read(key)
        }

        fn write(&mut self, key: &str, value: &str) -> std::result::Result<(), StoreError> {
            if key != DEFAULT_LEDGER_KEY && self.failing_writes > 0 {
                self.failing_writes -= 1;
                return Err(StoreError::QuotaExceeded {
                    needed: value.len(),
                    available: 0,
                });
            }
            self.inner.write(key, value)
        }

        fn delete(&mut self, key: &str) {
            self.inner.delete(key)
        }

        fn len(&self) -> usize {
            self.inner.len()
        }

        fn keys(&self) -> Vec<String> {
            self.inner.keys()
        }
    }

    fn filled(capacity: usize, count: usize) -> PosterCache<MemoryStore> {
        let mut cache = PosterCache::new(MemoryStore::new(), capacity);
        for i in 0..count {
            cache.set(&format!("k{}", i), &format!("v{}", i));
        }
        cache
    }

    #[test]
    fn test_set_and_get() {
        let mut cache = PosterCache::new(MemoryStore::new(), 10);

        assert_eq!(cache.set("poster_tt1", "data:1"), SetOutcome::Stored);
        assert_eq!(cache.get("poster_tt1"), Some("data:1".to_string()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_get_missing_leaves_ledger_alone() {
        let mut cache = filled(10, 3);
        let before = cache.ledger();

        assert_eq!(cache.get("nope"), None);
        assert_eq!(cache.ledger(), before);
    }

    #[test]
    fn test_get_promotes_to_newest() {
        let mut cache = filled(10, 3);

        cache.get("k0").unwrap();
        assert_eq!(cache.ledger().keys(), ["k1", "k2", "k0"]);
    }

    #[test]
    fn test_overwrite_keeps_single_ledger_entry() {
        let mut cache = filled(10, 3);

        cache.set("k0", "new");
        assert_eq!(cache.ledger().keys(), ["k1", "k2", "k0"]);
        assert_eq!(cache.get("k0"), Some("new".to_string()));
    }

    #[test]
    fn test_capacity_eviction_drops_oldest() {
        let mut cache = filled(3, 4);

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get("k0"), None);
        assert!(cache.get("k1").is_some());
        assert!(cache.get("k3").is_some());
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_get_protects_from_capacity_eviction() {
        let mut cache = filled(3, 3);

        cache.get("k0").unwrap();
        cache.set("k3", "v3");

        assert!(cache.get("k0").is_some());
        assert_eq!(cache.get("k1"), None);
    }

    #[test]
    fn test_hundred_and_one_keys_evict_first() {
        let mut cache = filled(100, 101);

        assert_eq!(cache.len(), 100);
        assert_eq!(cache.get("k0"), None);
        for i in 1..=100 {
            assert!(cache.get(&format!("k{}", i)).is_some(), "k{} missing", i);
        }
    }

    #[test]
    fn test_emergency_eviction_count() {
        assert_eq!(emergency_eviction_count(0), 0);
        assert_eq!(emergency_eviction_count(1), 1);
        assert_eq!(emergency_eviction_count(9), 1);
        assert_eq!(emergency_eviction_count(10), 1);
        assert_eq!(emergency_eviction_count(19), 1);
        assert_eq!(emergency_eviction_count(20), 2);
        assert_eq!(emergency_eviction_count(100), 10);
    }

    #[test]
    fn test_forced_eviction_skips_recently_read_entry() {
        let mut cache = filled(100, 50);

        cache.get("k25").unwrap();
        cache.set("fresh", "value");

        let evicted = cache.evict(true).unwrap();
        assert_eq!(evicted, 5);
        assert!(cache.get("k25").is_some());
        assert_eq!(cache.get("k0"), None);
        assert_eq!(cache.ledger().oldest(), Some("k5"));
    }

    #[test]
    fn test_forced_eviction_on_empty_ledger() {
        let mut cache = PosterCache::new(MemoryStore::new(), 10);
        assert_eq!(cache.evict(true).unwrap(), 0);
    }

    #[test]
    fn test_quota_failure_recovers_after_eviction() {
        let mut cache = PosterCache::new(FlakyStore::default(), 100);
        for i in 0..20 {
            cache.set(&format!("k{}", i), "v");
        }

        cache.store_mut().failing_writes = 1;
        assert_eq!(cache.set("new", "v"), SetOutcome::StoredAfterEviction);

        let stats = cache.stats();
        assert_eq!(stats.emergency_evictions, 2);
        assert_eq!(cache.get("k0"), None);
        assert_eq!(cache.get("k1"), None);
        assert_eq!(cache.ledger().newest(), Some("new"));
    }

    #[test]
    fn test_double_failure_drops_value_without_panicking() {
        let mut cache = PosterCache::new(FlakyStore::default(), 10);
        cache.set("old", "v");

        cache.store_mut().failing_writes = 2;
        assert_eq!(cache.set("doomed", "v"), SetOutcome::Dropped);

        assert_eq!(cache.store().read("doomed"), None);
        assert!(!cache.ledger().contains("doomed"));
        assert_eq!(cache.stats().dropped_writes, 1);
    }

    #[test]
    fn test_real_quota_exhaustion() {
        // Room for the ledger plus a handful of 100 byte posters
        let mut cache = PosterCache::new(MemoryStore::with_quota(700), 100);
        let poster = "x".repeat(100);

        for i in 0..10 {
            cache.set(&format!("p{}", i), &poster);
        }

        assert!(cache.len() < 10);
        assert_eq!(cache.ledger().newest(), Some("p9"));
        assert!(cache.store().used_bytes() <= 700);
    }

    #[test]
    fn test_oversized_value_is_dropped() {
        let mut cache = PosterCache::new(MemoryStore::with_quota(64), 10);
        cache.set("small", "v");

        let huge = "x".repeat(1000);
        assert_eq!(cache.set("huge", &huge), SetOutcome::Dropped);
        assert_eq!(cache.store().read("huge"), None);
    }

    #[test]
    fn test_ledger_key_is_reserved() {
        let mut cache = PosterCache::new(MemoryStore::new(), 10);
        cache.set("k", "v");

        assert_eq!(cache.set(DEFAULT_LEDGER_KEY, "[]"), SetOutcome::Rejected);
        assert_eq!(cache.get(DEFAULT_LEDGER_KEY), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_corrupt_ledger_self_heals() {
        let mut store = MemoryStore::new();
        store.write(DEFAULT_LEDGER_KEY, "garbage").unwrap();

        let mut cache = PosterCache::new(store, 10);
        assert!(cache.is_empty());

        cache.set("k", "v");
        assert_eq!(cache.ledger().keys(), ["k"]);
    }

    #[test]
    fn test_custom_ledger_key() {
        let mut cache = PosterCache::new(MemoryStore::new(), 10).with_ledger_key("mru");
        cache.set("k", "v");

        assert!(cache.store().read("mru").is_some());
        assert!(cache.store().read(DEFAULT_LEDGER_KEY).is_none());
    }

    #[test]
    fn test_zero_capacity_keeps_newest() {
        let cache = filled(0, 3);
        assert_eq!(cache.capacity(), 1);
        assert_eq!(cache.ledger().keys(), ["k2"]);
    }
}
