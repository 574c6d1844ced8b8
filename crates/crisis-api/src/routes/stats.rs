//! Routes for dashboard statistics.
//!
//! These return raw aggregates; presentation is left to the client.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use crisis_core::model::{AgeBandStats, AttributeImpact, ScenarioChoiceStats};
use crisis_scoring::application::query_handlers;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /choices
async fn choice_overview(
    State(state): State<AppState>,
) -> Result<Json<Vec<ScenarioChoiceStats>>, ApiError> {
    Ok(Json(query_handlers::get_choice_overview(&*state.statistics).await?))
}

/// GET /age-bands
async fn age_behavior(State(state): State<AppState>) -> Result<Json<Vec<AgeBandStats>>, ApiError> {
    Ok(Json(query_handlers::get_age_behavior(&*state.statistics).await?))
}

/// GET /attributes
async fn attribute_impacts(
    State(state): State<AppState>,
) -> Result<Json<Vec<AttributeImpact>>, ApiError> {
    Ok(Json(query_handlers::get_attribute_impacts(&*state.statistics).await?))
}

/// Returns the router for statistics.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/choices", get(choice_overview))
        .route("/age-bands", get(age_behavior))
        .route("/attributes", get(attribute_impacts))
}
