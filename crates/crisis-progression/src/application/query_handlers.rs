//! Query handlers for the progression context.
//!
//! Views hide each choice's correctness and outcome so a client cannot read
//! the answer before submitting.

use crisis_core::error::DomainError;
use crisis_core::model::Level;
use crisis_core::repository::ScenarioRepository;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::session::PlayerSession;
use crate::media::{MediaProvider, ScenarioMedia};

/// A selectable option as shown to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceView {
    /// The choice identifier to submit.
    pub choice_id: Uuid,
    /// Text shown on the option.
    pub option_text: String,
}

/// The scenario currently shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioView {
    /// Scenario identifier.
    pub scenario_id: Uuid,
    /// Narrative text.
    pub prompt_text: String,
    /// Options in display order.
    pub choices: Vec<ChoiceView>,
    /// Media for the scenario, if any.
    pub media: Option<ScenarioMedia>,
}

/// Read-only view of a player session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    /// Session identifier.
    pub session_id: Uuid,
    /// The player.
    pub user_id: Uuid,
    /// The level being played.
    pub level_id: Uuid,
    /// Zero-based position in the sequence.
    pub current_index: usize,
    /// Number of scenarios in the level.
    pub scenario_count: usize,
    /// Whether the current scenario has been answered.
    pub answered: bool,
    /// Whether the run is over.
    pub finished: bool,
    /// The current scenario, absent once finished.
    pub scenario: Option<ScenarioView>,
}

/// Builds the view of `session` as it stands.
#[must_use]
pub fn session_view(session: &PlayerSession, media: &dyn MediaProvider) -> SessionView {
    let scenario = session.current().ok().map(|step| ScenarioView {
        scenario_id: step.scenario.id,
        prompt_text: step.scenario.prompt_text.clone(),
        choices: step
            .choices
            .iter()
            .map(|c| ChoiceView {
                choice_id: c.id,
                option_text: c.option_text.clone(),
            })
            .collect(),
        media: media.scenario_media(step.scenario.id),
    });

    SessionView {
        session_id: session.id(),
        user_id: session.user_id(),
        level_id: session.level_id(),
        current_index: session.current_index(),
        scenario_count: session.len(),
        answered: session.is_answered(),
        finished: session.is_finished(),
        scenario,
    }
}

/// Every playable level, ordered by level number.
///
/// # Errors
///
/// Propagates storage failures.
pub async fn list_levels(scenarios: &dyn ScenarioRepository) -> Result<Vec<Level>, DomainError> {
    scenarios.list_levels().await
}
