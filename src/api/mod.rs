//! API Module
//!
//! HTTP handlers and routing for the cache service REST API.
//!
//! # Endpoints
//! - `PUT /posters` - Cache an encoded poster
//! - `GET /posters/:key` - Look up a poster
//! - `PUT /details` - Cache movie details
//! - `GET /details/:id` - Look up movie details
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
