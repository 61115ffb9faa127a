//! Response DTOs for the cache service API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::{CacheStats, SetOutcome};

/// Response body for a poster lookup (GET /posters/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetPosterResponse {
    pub key: String,
    pub value: String,
}

impl GetPosterResponse {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Response body for storing a poster (PUT /posters)
#[derive(Debug, Clone, Serialize)]
pub struct SetPosterResponse {
    /// Human readable summary
    pub message: String,
    pub key: String,
    /// Whether the store had to evict to make room
    pub outcome: SetOutcome,
}

impl SetPosterResponse {
    pub fn new(key: impl Into<String>, outcome: SetOutcome) -> Self {
        let key = key.into();
        let message = match outcome {
            SetOutcome::StoredAfterEviction => {
                format!("Key '{}' cached after evicting older posters", key)
            }
            _ => format!("Key '{}' cached successfully", key),
        };
        Self {
            message,
            key,
            outcome,
        }
    }
}

/// Response body for storing movie details (PUT /details)
#[derive(Debug, Clone, Serialize)]
pub struct SetDetailsResponse {
    pub id: String,
    /// Seconds until the entry expires unless read again
    pub expires_in_secs: u64,
}

impl SetDetailsResponse {
    pub fn new(id: impl Into<String>, expires_in_secs: u64) -> Self {
        Self {
            id: id.into(),
            expires_in_secs,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    /// Posters evicted to stay within capacity
    pub evictions: u64,
    /// Posters evicted because the store was full
    pub emergency_evictions: u64,
    /// Posters that could not be stored at all
    pub dropped_writes: u64,
    /// Posters currently cached
    pub total_entries: usize,
    pub capacity: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Movie details currently cached
    pub detail_entries: usize,
}

impl StatsResponse {
    /// Creates a new StatsResponse from poster cache statistics
    pub fn new(stats: &CacheStats, capacity: usize, detail_entries: usize) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            emergency_evictions: stats.emergency_evictions,
            dropped_writes: stats.dropped_writes,
            total_entries: stats.total_entries,
            capacity,
            hit_rate: stats.hit_rate(),
            detail_entries,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_poster_response_serialize() {
        let resp = GetPosterResponse::new("poster_tt1", "data:x");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("poster_tt1"));
        assert!(json.contains("data:x"));
    }

    #[test]
    fn test_set_poster_response_outcome() {
        let resp = SetPosterResponse::new("poster_tt1", SetOutcome::StoredAfterEviction);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["outcome"], "stored_after_eviction");
        assert!(json["message"].as_str().unwrap().contains("evicting"));

        let resp = SetPosterResponse::new("poster_tt1", SetOutcome::Stored);
        assert!(resp.message.contains("successfully"));
    }

    #[test]
    fn test_stats_response_from_stats() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        stats.record_emergency_evictions(4);
        stats.set_total_entries(7);

        let resp = StatsResponse::new(&stats, 100, 2);
        assert!((resp.hit_rate - 0.75).abs() < 0.001);
        assert_eq!(resp.emergency_evictions, 4);
        assert_eq!(resp.total_entries, 7);
        assert_eq!(resp.detail_entries, 2);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
