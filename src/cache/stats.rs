//! Cache Statistics Module
//!
//! Tracks poster cache hits, misses, and eviction activity.

use serde::Serialize;

// == Cache Stats ==
/// Tracks poster cache performance metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of lookups that found a value
    pub hits: u64,
    /// Number of lookups that found nothing
    pub misses: u64,
    /// Entries removed to get back under capacity
    pub evictions: u64,
    /// Entries removed to recover from a full store
    pub emergency_evictions: u64,
    /// Values that could not be stored even after emergency eviction
    pub dropped_writes: u64,
    /// Keys currently tracked by the ledger
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Adds `count` capacity evictions.
    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }

    /// Adds `count` emergency evictions.
    pub fn record_emergency_evictions(&mut self, count: usize) {
        self.emergency_evictions += count as u64;
    }

    pub fn record_dropped_write(&mut self) {
        self.dropped_writes += 1;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
