//! API Handlers
//!
//! HTTP request handlers for each cache service endpoint.

use std::sync::Arc;
use tokio::sync::RwLock;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use crate::cache::{PosterCache, SetOutcome};
use crate::config::Config;
use crate::details::{DetailCache, MovieDetails};
use crate::error::{CacheError, Result, StoreError};
use crate::models::{
    GetPosterResponse, HealthResponse, SetDetailsRequest, SetDetailsResponse, SetPosterRequest,
    SetPosterResponse, StatsResponse,
};
use crate::store::{FileStore, KeyValueStore, MemoryStore};
use crate::tasks::TokioScheduler;

/// Store type the service runs the poster cache on.
pub type SharedStore = Box<dyn KeyValueStore + Send + Sync>;

/// Application state shared across all handlers.
///
/// The poster cache sits behind a RwLock; lookups take the write lock
/// because a hit updates the MRU ledger.
#[derive(Clone)]
pub struct AppState {
    pub posters: Arc<RwLock<PosterCache<SharedStore>>>,
    pub details: DetailCache<MovieDetails>,
}

impl AppState {
    /// Creates a new AppState from the given caches.
    pub fn new(posters: PosterCache<SharedStore>, details: DetailCache<MovieDetails>) -> Self {
        Self {
            posters: Arc::new(RwLock::new(posters)),
            details,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Opens the file store when a path is configured, otherwise keeps
    /// posters in memory. Must be called inside a tokio runtime.
    pub fn from_config(config: &Config) -> std::result::Result<Self, StoreError> {
        let store: SharedStore = match &config.store_path {
            Some(path) => {
                info!("Using poster store file {}", path.display());
                Box::new(FileStore::open(path, config.store_quota)?)
            }
            None => {
                info!("Using in-memory poster store");
                Box::new(match config.store_quota {
                    Some(quota) => MemoryStore::with_quota(quota),
                    None => MemoryStore::new(),
                })
            }
        };

        let posters = PosterCache::new(store, config.poster_capacity);
        let details = DetailCache::new(Arc::new(TokioScheduler::new()), config.detail_ttl());
        Ok(Self::new(posters, details))
    }
}

/// Handler for PUT /posters
///
/// Caches an encoded poster. Answers 507 when the store stays full even
/// after emergency eviction.
pub async fn set_poster_handler(
    State(state): State<AppState>,
    Json(req): Json<SetPosterRequest>,
) -> Result<Json<SetPosterResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let outcome = state.posters.write().await.set(&req.key, &req.value);

    match outcome {
        SetOutcome::Stored | SetOutcome::StoredAfterEviction => {
            Ok(Json(SetPosterResponse::new(req.key, outcome)))
        }
        SetOutcome::Dropped => Err(CacheError::InsufficientStorage(format!(
            "Poster '{}' does not fit in the store",
            req.key
        ))),
        SetOutcome::Rejected => Err(CacheError::InvalidRequest(format!(
            "Key '{}' is reserved",
            req.key
        ))),
    }
}

/// Handler for GET /posters/:key
pub async fn get_poster_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetPosterResponse>> {
    // Write lock: a hit reorders the ledger
    let value = state.posters.write().await.get(&key);

    match value {
        Some(value) => Ok(Json(GetPosterResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for PUT /details
pub async fn set_details_handler(
    State(state): State<AppState>,
    Json(req): Json<SetDetailsRequest>,
) -> Result<Json<SetDetailsResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    state.details.insert(&req.id, req.details);
    Ok(Json(SetDetailsResponse::new(
        req.id,
        state.details.ttl().as_secs(),
    )))
}

/// Handler for GET /details/:id
///
/// A hit restarts the entry's expiry window.
pub async fn get_details_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MovieDetails>> {
    state
        .details
        .get(&id)
        .map(Json)
        .ok_or(CacheError::NotFound(id))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let posters = state.posters.read().await;
    let stats = posters.stats();

    Json(StatsResponse::new(
        &stats,
        posters.capacity(),
        state.details.len(),
    ))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
