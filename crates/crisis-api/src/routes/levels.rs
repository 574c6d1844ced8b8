//! Routes for the level catalog.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use crisis_core::model::Level;
use crisis_progression::application::query_handlers;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /
async fn list_levels(State(state): State<AppState>) -> Result<Json<Vec<Level>>, ApiError> {
    Ok(Json(query_handlers::list_levels(&*state.scenarios).await?))
}

/// Returns the router for levels.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_levels))
}
