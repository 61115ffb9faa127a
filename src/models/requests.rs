//! Request DTOs for the cache service API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::cache::MAX_KEY_LENGTH;
use crate::details::MovieDetails;

/// Request body for storing a poster (PUT /posters)
///
/// # Fields
/// - `key`: Store key, normally `poster_<imdb id>`
/// - `value`: Encoded image, normally a data URI
#[derive(Debug, Clone, Deserialize)]
pub struct SetPosterRequest {
    pub key: String,
    pub value: String,
}

impl SetPosterRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_key("Key", &self.key)
    }
}

/// Request body for storing movie details (PUT /details)
#[derive(Debug, Clone, Deserialize)]
pub struct SetDetailsRequest {
    /// Movie id, e.g. an IMDb id
    pub id: String,
    pub details: MovieDetails,
}

impl SetDetailsRequest {
    pub fn validate(&self) -> Option<String> {
        validate_key("Id", &self.id)
    }
}

fn validate_key(field: &str, key: &str) -> Option<String> {
    if key.is_empty() {
        return Some(format!("{} cannot be empty", field));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "{} exceeds maximum length of {} characters",
            field, MAX_KEY_LENGTH
        ));
    }
    None
}
