//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use crisis_api::state::{AppState, GameSettings};
use crisis_progression::media::StaticMediaProvider;
use crisis_store::pg_game_store::PgGameStore;
use crisis_test_support::{FixedClock, fixed_now};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

/// Bundled scenario pack used to seed integration tests.
pub const DAY_ONE_PACK: &str = include_str!("../../../crisis-content/packs/crisis_day_one.yaml");

/// State over a real `PgGameStore` with a fixed clock.
pub fn build_test_state(pool: PgPool) -> AppState {
    AppState::from_store(
        PgGameStore::new(pool),
        Arc::new(FixedClock(fixed_now())),
        Arc::new(StaticMediaProvider::new("/media")),
        GameSettings::default(),
    )
}

/// Build the full app router over `state`, as `main.rs` does.
pub fn build_test_app(state: AppState) -> Router {
    crisis_api::app(state)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(app: Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();
    send(app, request).await
}

/// Send a PUT request with a JSON body and return the response.
pub async fn put_json(app: Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();
    send(app, request).await
}

/// Send a POST request with a YAML body and return the response.
pub async fn post_yaml(app: Router, uri: &str, yaml: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/yaml")
        .body(Body::from(yaml.to_owned()))
        .unwrap();
    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// Import the bundled pack and register a player aged `age`; returns the
/// player id.
pub async fn seed(state: &AppState, age: i32) -> String {
    let (status, _) = post_yaml(build_test_app(state.clone()), "/api/v1/content/packs", DAY_ONE_PACK).await;
    assert_eq!(status, StatusCode::CREATED);
    register(state, age).await
}

/// Register a player aged `age`; returns the player id.
pub async fn register(state: &AppState, age: i32) -> String {
    let (status, json) = post_json(
        build_test_app(state.clone()),
        "/api/v1/players",
        &serde_json::json!({ "firstname": "Alex", "lastname": "Lind", "age": age, "crisis_ready": true }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    json["user_id"].as_str().unwrap().to_owned()
}
