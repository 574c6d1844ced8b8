//! Crisis Drill API server library.
//!
//! Exposes the route modules and application state so the binary and the
//! integration tests assemble the same router.

use axum::Router;

pub mod config;
pub mod error;
pub mod routes;
pub mod sessions;
pub mod state;
pub mod telemetry;

use state::AppState;

/// Builds the full application router over `state`.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/players", routes::players::router())
        .nest("/api/v1/levels", routes::levels::router())
        .nest("/api/v1/sessions", routes::sessions::router())
        .nest("/api/v1/attributes", routes::attributes::router())
        .nest("/api/v1/choices", routes::choices::router())
        .nest("/api/v1/content", routes::content::router())
        .nest("/api/v1/stats", routes::stats::router())
        .with_state(state)
}
