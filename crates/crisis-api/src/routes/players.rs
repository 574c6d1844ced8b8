//! Routes for player registration and attribute summaries.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use crisis_core::model::{AttributeTotal, Player};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crisis_scoring::application::query_handlers::{self, PlayerProfile};
use crisis_scoring::application::command_handlers;
use crisis_scoring::domain::commands;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct RegisterPlayerRequest {
    /// Given name.
    pub firstname: String,
    /// Family name.
    pub lastname: String,
    /// Age in years.
    pub age: i32,
    /// Self-reported crisis readiness.
    #[serde(default)]
    pub crisis_ready: Option<bool>,
}

/// POST /
#[instrument(skip(state, request))]
async fn register_player(
    State(state): State<AppState>,
    Json(request): Json<RegisterPlayerRequest>,
) -> Result<(StatusCode, Json<Player>), ApiError> {
    let command = commands::RegisterPlayer {
        correlation_id: Uuid::new_v4(),
        firstname: request.firstname,
        lastname: request.lastname,
        age: request.age,
        crisis_ready: request.crisis_ready,
    };

    info!(correlation_id = %command.correlation_id, "handling register_player command");

    let player =
        command_handlers::handle_register_player(&command, state.clock.as_ref(), &*state.players)
            .await?;

    Ok((StatusCode::CREATED, Json(player)))
}

/// GET /{user_id}
#[instrument(skip(state))]
async fn get_player(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<PlayerProfile>, ApiError> {
    let profile = query_handlers::get_player_profile(
        user_id,
        &*state.players,
        &*state.attributes,
        &*state.scoring,
        state.settings.bounds,
    )
    .await?;

    Ok(Json(profile))
}

/// GET /{user_id}/attributes
#[instrument(skip(state))]
async fn get_player_attributes(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<AttributeTotal>>, ApiError> {
    let totals = query_handlers::get_player_attribute_totals(
        user_id,
        &*state.players,
        &*state.attributes,
        &*state.scoring,
        state.settings.bounds,
    )
    .await?;

    Ok(Json(totals))
}

/// Returns the router for players.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(register_player))
        .route("/{user_id}", get(get_player))
        .route("/{user_id}/attributes", get(get_player_attributes))
}
