//! Details Module
//!
//! Short-lived cache of movie details with sliding expiration.

mod cache;
mod movie;

pub use cache::{DetailCache, DEFAULT_DETAIL_TTL};
pub use movie::MovieDetails;
