//! Routes for choice-to-attribute effects.

use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use crisis_core::model::{AttributeEffect, ChoiceAttributeEffect};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crisis_scoring::application::{command_handlers, query_handlers};
use crisis_scoring::domain::commands;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for PUT /{choice_id}/effects/{attribute_id}.
#[derive(Debug, Deserialize)]
pub struct LinkEffectRequest {
    /// Signed score contribution.
    pub delta: i64,
}

/// GET /{choice_id}/effects
#[instrument(skip(state))]
async fn get_effects(
    State(state): State<AppState>,
    Path(choice_id): Path<Uuid>,
) -> Result<Json<Vec<AttributeEffect>>, ApiError> {
    let effects =
        query_handlers::get_effects_for_choice(choice_id, &*state.scenarios, &*state.scoring)
            .await?;
    Ok(Json(effects))
}

/// PUT /{choice_id}/effects/{attribute_id}
#[instrument(skip(state, request))]
async fn link_effect(
    State(state): State<AppState>,
    Path((choice_id, attribute_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<LinkEffectRequest>,
) -> Result<Json<ChoiceAttributeEffect>, ApiError> {
    let command = commands::LinkChoiceToAttribute {
        correlation_id: Uuid::new_v4(),
        choice_id,
        attribute_id,
        delta: request.delta,
    };

    info!(correlation_id = %command.correlation_id, "handling link_choice_to_attribute command");

    let effect = command_handlers::handle_link_choice_to_attribute(
        &command,
        &*state.scenarios,
        &*state.attributes,
        &*state.scoring,
    )
    .await?;

    Ok(Json(effect))
}

/// Returns the router for choices.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{choice_id}/effects", get(get_effects))
        .route("/{choice_id}/effects/{attribute_id}", put(link_effect))
}
