//! Helpers shared by route tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use crisis_progression::media::StaticMediaProvider;
use crisis_test_support::{FailingGameStore, FixedClock, GameFixture, fixed_now};
use serde_json::Value;
use tower::ServiceExt;

use crate::state::{AppState, GameSettings};

/// State over a freshly seeded in-memory store, plus the seeded fixture.
pub(crate) fn fixture_state() -> (AppState, GameFixture) {
    let fixture = GameFixture::new();
    let state = AppState::from_store(
        fixture.store.clone(),
        Arc::new(FixedClock(fixed_now())),
        Arc::new(StaticMediaProvider::new("/media")),
        GameSettings::default(),
    );
    (state, fixture)
}

/// State whose every repository call fails.
pub(crate) fn failing_state() -> AppState {
    AppState::from_store(
        FailingGameStore,
        Arc::new(FixedClock(fixed_now())),
        Arc::new(StaticMediaProvider::new("/media")),
        GameSettings::default(),
    )
}

/// Sends one request and decodes the JSON response; an empty body decodes
/// to `Value::Null`.
pub(crate) async fn send(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
