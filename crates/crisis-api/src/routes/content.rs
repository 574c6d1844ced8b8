//! Routes for scenario pack import.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use crisis_content::application::command_handlers::{self, ImportSummary};
use crisis_content::domain::commands;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// POST /packs
///
/// The request body is the YAML pack document.
#[instrument(skip(state, source), fields(bytes = source.len()))]
async fn import_pack(
    State(state): State<AppState>,
    source: String,
) -> Result<(StatusCode, Json<ImportSummary>), ApiError> {
    let command = commands::ImportScenarioPack {
        correlation_id: Uuid::new_v4(),
        source,
    };

    info!(correlation_id = %command.correlation_id, "handling import_scenario_pack command");

    let summary = command_handlers::handle_import_pack(
        &command,
        &*state.scenarios,
        &*state.attributes,
        &*state.catalog,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(summary)))
}

/// Returns the router for content.
pub fn router() -> Router<AppState> {
    Router::new().route("/packs", post(import_pack))
}
