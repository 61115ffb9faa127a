//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use poster_cache::{
    api::{create_router, SharedStore},
    tasks::ManualScheduler,
    AppState, DetailCache, MemoryStore, PosterCache,
};
use serde_json::Value;
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app(capacity: usize, store: SharedStore) -> (ManualScheduler, Router) {
    let scheduler = ManualScheduler::new();
    let details = DetailCache::new(Arc::new(scheduler.clone()), Duration::from_secs(300));
    let state = AppState::new(PosterCache::new(store, capacity), details);
    (scheduler, create_router(state))
}

fn default_app() -> (ManualScheduler, Router) {
    create_test_app(100, Box::new(MemoryStore::new()))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn put_json(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn poster_body(key: &str) -> String {
    format!(r#"{{"key":"{}","value":"data:image/jpeg;base64,{}"}}"#, key, key)
}

// == Poster Endpoint Tests ==

#[tokio::test]
async fn test_set_poster_success() {
    let (_, app) = default_app();

    let response = app
        .oneshot(put_json("/posters", poster_body("poster_tt1")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["key"], "poster_tt1");
    assert_eq!(json["outcome"], "stored");
}

#[tokio::test]
async fn test_get_poster_success() {
    let (_, app) = default_app();

    let set_response = app
        .clone()
        .oneshot(put_json("/posters", poster_body("poster_tt2")))
        .await
        .unwrap();
    assert_eq!(set_response.status(), StatusCode::OK);

    let get_response = app.oneshot(get("/posters/poster_tt2")).await.unwrap();

    assert_eq!(get_response.status(), StatusCode::OK);
    let json = body_to_json(get_response.into_body()).await;
    assert_eq!(json["key"], "poster_tt2");
    assert_eq!(json["value"], "data:image/jpeg;base64,poster_tt2");
}

#[tokio::test]
async fn test_get_poster_not_found() {
    let (_, app) = default_app();

    let response = app.oneshot(get("/posters/poster_missing")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("poster_missing"));
}

#[tokio::test]
async fn test_set_poster_empty_key() {
    let (_, app) = default_app();

    let response = app
        .oneshot(put_json("/posters", poster_body("")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_set_poster_malformed_json() {
    let (_, app) = default_app();

    let response = app
        .oneshot(put_json("/posters", "{not json".to_string()))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_poster_over_quota_is_rejected() {
    let (_, app) = create_test_app(100, Box::new(MemoryStore::with_quota(64)));

    let big = format!(r#"{{"key":"poster_big","value":"{}"}}"#, "x".repeat(500));
    let response = app.clone().oneshot(put_json("/posters", big)).await.unwrap();
    assert_eq!(response.status(), StatusCode::INSUFFICIENT_STORAGE);

    let response = app.oneshot(get("/posters/poster_big")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_capacity_eviction_over_http() {
    let (_, app) = create_test_app(2, Box::new(MemoryStore::new()));

    for key in ["poster_a", "poster_b"] {
        app.clone()
            .oneshot(put_json("/posters", poster_body(key)))
            .await
            .unwrap();
    }

    // Reading a makes b the eviction candidate
    let response = app.clone().oneshot(get("/posters/poster_a")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    app.clone()
        .oneshot(put_json("/posters", poster_body("poster_c")))
        .await
        .unwrap();

    let response = app.clone().oneshot(get("/posters/poster_b")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = app.oneshot(get("/posters/poster_a")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// == Details Endpoint Tests ==

#[tokio::test]
async fn test_details_sliding_expiry() {
    let (scheduler, app) = default_app();

    let body = r#"{"id":"tt0078748","details":{"Title":"Alien","Year":"1979","Director":"Ridley Scott","Genre":"Horror","imdbRating":"8.5"}}"#;
    let response = app
        .clone()
        .oneshot(put_json("/details", body.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["expires_in_secs"], 300);

    scheduler.advance(Duration::from_secs(240));
    let response = app.clone().oneshot(get("/details/tt0078748")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["Title"], "Alien");
    assert_eq!(json["imdbRating"], "8.5");

    // Still alive 480s after insert because it was read at 240s
    scheduler.advance(Duration::from_secs(240));
    let response = app.clone().oneshot(get("/details/tt0078748")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    scheduler.advance(Duration::from_secs(300));
    let response = app.oneshot(get("/details/tt0078748")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// == Stats and Health Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint() {
    let (_, app) = create_test_app(2, Box::new(MemoryStore::new()));

    for key in ["poster_a", "poster_b", "poster_c"] {
        app.clone()
            .oneshot(put_json("/posters", poster_body(key)))
            .await
            .unwrap();
    }
    app.clone().oneshot(get("/posters/poster_c")).await.unwrap();
    app.clone().oneshot(get("/posters/poster_a")).await.unwrap();

    let response = app.oneshot(get("/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["hits"], 1);
    assert_eq!(json["misses"], 1);
    assert_eq!(json["evictions"], 1);
    assert_eq!(json["total_entries"], 2);
    assert_eq!(json["capacity"], 2);
    assert_eq!(json["detail_entries"], 0);
}

#[tokio::test]
async fn test_health_endpoint() {
    let (_, app) = default_app();

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}

#[tokio::test]
async fn test_unknown_route() {
    let (_, app) = default_app();

    let response = app.oneshot(get("/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
