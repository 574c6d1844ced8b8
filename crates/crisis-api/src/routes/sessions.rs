//! Routes for playing a level.
//!
//! A session is started from a level, then driven by submitting a choice
//! for the current scenario and advancing. Every submitted choice is
//! recorded and scored before the response is sent.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crisis_progression::application::command_handlers as progression_commands;
use crisis_progression::application::query_handlers::{SessionView, session_view};
use crisis_progression::domain::commands::StartSession;
use crisis_progression::domain::session::ChoiceOutcome;
use crisis_scoring::application::command_handlers::{self as scoring_commands, ScoreChange};
use crisis_scoring::domain::commands::RecordChoice;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    /// The registered player.
    pub player_id: Uuid,
    /// The level to play.
    pub level_id: Uuid,
}

/// Request body for POST /{session_id}/choices.
#[derive(Debug, Deserialize)]
pub struct SubmitChoiceRequest {
    /// The picked choice.
    pub choice_id: Uuid,
}

/// Response body for a submitted choice.
#[derive(Debug, Serialize)]
pub struct SubmitChoiceResponse {
    /// How the choice was judged.
    #[serde(flatten)]
    pub outcome: ChoiceOutcome,
    /// Clip matching the judgement, if the scenario has media.
    pub feedback_media: Option<String>,
    /// The appended choice record.
    pub record_id: Uuid,
    /// Attribute scores after the choice.
    pub score_changes: Vec<ScoreChange>,
}

/// POST /
#[instrument(skip(state, request), fields(level_id = %request.level_id))]
async fn start_session(
    State(state): State<AppState>,
    Json(request): Json<StartSessionRequest>,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    let command = StartSession {
        correlation_id: Uuid::new_v4(),
        user_id: request.player_id,
        level_id: request.level_id,
    };

    info!(correlation_id = %command.correlation_id, "handling start_session command");

    let session = progression_commands::handle_start_session(
        &command,
        &*state.players,
        &*state.scenarios,
        state.settings.min_choices,
    )
    .await?;

    let view = session_view(&session, &*state.media);
    state.sessions.insert(session);
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /{session_id}
#[instrument(skip(state))]
async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let session = state.sessions.get(session_id)?;
    Ok(Json(session_view(&session, &*state.media)))
}

/// POST /{session_id}/choices
///
/// The session adjudicates and marks the scenario answered under the
/// registry lock, so a choice from another scenario or a second answer is
/// rejected before anything is written. The session does not move. If
/// recording fails the scenario is reopened.
#[instrument(skip(state, request), fields(choice_id = %request.choice_id))]
async fn submit_choice(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SubmitChoiceRequest>,
) -> Result<Json<SubmitChoiceResponse>, ApiError> {
    let (outcome, user_id, level_id) = state.sessions.update(session_id, |session| {
        let outcome = session.answer(request.choice_id)?;
        Ok((outcome, session.user_id(), session.level_id()))
    })?;

    let command = RecordChoice {
        correlation_id: Uuid::new_v4(),
        user_id,
        level_id,
        scenario_id: outcome.scenario_id,
        choice_id: outcome.choice_id,
    };

    info!(correlation_id = %command.correlation_id, %session_id, "handling record_choice command");

    let recorded = match scoring_commands::handle_record_choice(
        &command,
        state.clock.as_ref(),
        &*state.players,
        &*state.scenarios,
        &*state.scoring,
        state.settings.bounds,
    )
    .await
    {
        Ok(recorded) => recorded,
        Err(err) => {
            // The session may have been ended meanwhile.
            let _ = state.sessions.update(session_id, |session| {
                session.withdraw_answer();
                Ok(())
            });
            return Err(err.into());
        }
    };

    let feedback_media = state.media.scenario_media(outcome.scenario_id).map(|m| {
        if outcome.is_correct {
            m.correct_outcome
        } else {
            m.wrong_outcome
        }
    });

    Ok(Json(SubmitChoiceResponse {
        outcome,
        feedback_media,
        record_id: recorded.record.id,
        score_changes: recorded.score_changes,
    }))
}

/// POST /{session_id}/advance
///
/// Advancing past the last scenario returns the finished view and discards
/// the session.
#[instrument(skip(state))]
async fn advance_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let view = state.sessions.update(session_id, |session| {
        session.advance();
        Ok(session_view(session, &*state.media))
    })?;
    if view.finished {
        info!(%session_id, "session finished");
    }
    Ok(Json(view))
}

/// DELETE /{session_id}
#[instrument(skip(state))]
async fn end_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.sessions.remove(session_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the router for sessions.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(start_session))
        .route("/{session_id}", get(get_session).delete(end_session))
        .route("/{session_id}/choices", post(submit_choice))
        .route("/{session_id}/advance", post(advance_session))
}
