//! Poster Cache - caching core of a movie search widget
//!
//! Bounded poster cache with MRU eviction over a durable key-value store,
//! a sliding-expiry cache for movie details, and search paging helpers.

pub mod api;
pub mod cache;
pub mod config;
pub mod details;
pub mod error;
pub mod models;
pub mod search;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use cache::{PosterCache, SetOutcome};
pub use config::Config;
pub use details::{DetailCache, MovieDetails};
pub use store::{FileStore, KeyValueStore, MemoryStore};
