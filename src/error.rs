//! Error types for the poster cache
//!
//! `StoreError` covers the backing key-value store, `CacheError` the HTTP layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Store Error Enum ==
/// Failure reported by a backing key-value store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The write would push the store past its size quota
    #[error("Quota exceeded: need {needed} bytes, {available} available")]
    QuotaExceeded { needed: usize, available: usize },

    /// Persisting the store to disk failed
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The on-disk store could not be parsed
    #[error("Store file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl StoreError {
    /// Returns true if this is a quota exhaustion error.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, StoreError::QuotaExceeded { .. })
    }
}

// == Cache Error Enum ==
/// Unified error type for the HTTP service.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Value could not be stored even after emergency eviction
    #[error("Insufficient storage: {0}")]
    InsufficientStorage(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            CacheError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            CacheError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            CacheError::InsufficientStorage(msg) => (StatusCode::INSUFFICIENT_STORAGE, msg.clone()),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the HTTP service.
pub type Result<T> = std::result::Result<T, CacheError>;
