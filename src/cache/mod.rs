//! Cache Module
//!
//! Bounded poster cache with most-recently-used tracking over a durable store.

mod ledger;
mod poster;
mod stats;


// Re-export public types
pub use ledger::MruLedger;
pub use poster::{emergency_eviction_count, PosterCache, SetOutcome};
pub use stats::CacheStats;

// == Public Constants ==
/// Default number of posters kept
pub const DEFAULT_CAPACITY: usize = 100;

/// Store key the MRU ledger is persisted under by default
pub const DEFAULT_LEDGER_KEY: &str = "poster_cache_mru";

/// Maximum accepted key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Prefix callers put in front of poster keys
pub const POSTER_KEY_PREFIX: &str = "poster_";

/// Builds the store key for the poster of movie `id`.
pub fn poster_key(id: &str) -> String {
    format!("{}{}", POSTER_KEY_PREFIX, id)
}
