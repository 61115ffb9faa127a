//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default byte quota, the usual per-origin browser storage allowance.
const DEFAULT_STORE_QUOTA: usize = 5 * 1024 * 1024;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of posters kept in the cache
    pub poster_capacity: usize,
    /// JSON file backing the poster store; None keeps it in memory
    pub store_path: Option<PathBuf>,
    /// Byte quota of the poster store; None disables it
    pub store_quota: Option<usize>,
    /// Sliding expiry window for movie details, in seconds
    pub detail_ttl: u64,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `POSTER_CACHE_CAPACITY` - Maximum cached posters (default: 100)
    /// - `STORE_PATH` - Poster store file (default: unset, in-memory store)
    /// - `STORE_QUOTA_BYTES` - Store quota in bytes, 0 for none (default: 5 MiB)
    /// - `DETAIL_TTL_SECS` - Detail expiry window in seconds (default: 300)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            poster_capacity: parse_var("POSTER_CACHE_CAPACITY").unwrap_or(defaults.poster_capacity),
            store_path: env::var("STORE_PATH")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            store_quota: match parse_var::<usize>("STORE_QUOTA_BYTES") {
                Some(0) => None,
                Some(bytes) => Some(bytes),
                None => defaults.store_quota,
            },
            detail_ttl: parse_var("DETAIL_TTL_SECS").unwrap_or(defaults.detail_ttl),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
        }
    }

    /// Detail expiry window as a Duration.
    pub fn detail_ttl(&self) -> Duration {
        Duration::from_secs(self.detail_ttl)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poster_capacity: crate::cache::DEFAULT_CAPACITY,
            store_path: None,
            store_quota: Some(DEFAULT_STORE_QUOTA),
            detail_ttl: 300,
            server_port: 3000,
        }
    }
}
