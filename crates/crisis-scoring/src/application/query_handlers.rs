//! Query handlers for the scoring context.

use std::collections::HashMap;

use crisis_core::error::DomainError;
use crisis_core::model::{
    AgeBandStats, Attribute, AttributeEffect, AttributeImpact, AttributeTotal, Player,
    ScenarioChoiceStats,
};
use crisis_core::policy::ScoreBounds;
use crisis_core::repository::{
    AttributeRepository, PlayerRepository, ScenarioRepository, ScoringRepository,
    StatisticsRepository,
};
use serde::Serialize;
use tracing::{debug, instrument};
use uuid::Uuid;

/// A player with their attribute summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerProfile {
    /// The registered player.
    #[serde(flatten)]
    pub player: Player,
    /// Every catalog attribute with the player's score, highest first.
    pub attributes: Vec<AttributeTotal>,
}

/// Effects linked to a choice.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the choice does not exist and
/// propagates storage failures. A choice without effects yields an empty
/// list.
#[instrument(skip(scenarios, scoring))]
pub async fn get_effects_for_choice(
    choice_id: Uuid,
    scenarios: &dyn ScenarioRepository,
    scoring: &dyn ScoringRepository,
) -> Result<Vec<AttributeEffect>, DomainError> {
    scenarios.get_choice(choice_id).await?;
    let effects = scoring.effects_for_choice(choice_id).await?;
    debug!(effects = effects.len(), "loaded choice effects");
    Ok(effects)
}

/// Every catalog attribute with the player's bounded score, sorted by score
/// descending and then by name. Attributes the player never touched are
/// reported at `bounds.apply(0)`.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the player does not exist and
/// propagates storage failures.
#[instrument(skip(players, attributes, scoring))]
pub async fn get_player_attribute_totals(
    user_id: Uuid,
    players: &dyn PlayerRepository,
    attributes: &dyn AttributeRepository,
    scoring: &dyn ScoringRepository,
    bounds: ScoreBounds,
) -> Result<Vec<AttributeTotal>, DomainError> {
    players.get_player(user_id).await?;
    let catalog = attributes.list_attributes().await?;
    let scores: HashMap<Uuid, i64> = scoring
        .scores_for_player(user_id)
        .await?
        .into_iter()
        .map(|s| (s.attribute_id, s.score))
        .collect();

    let mut totals: Vec<AttributeTotal> = catalog
        .into_iter()
        .map(|a| AttributeTotal {
            score: bounds.apply(scores.get(&a.id).copied().unwrap_or(0)),
            attribute_id: a.id,
            name: a.name,
            description: a.description,
        })
        .collect();
    totals.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
    Ok(totals)
}

/// A player's registration details with their attribute totals.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the player does not exist and
/// propagates storage failures.
pub async fn get_player_profile(
    user_id: Uuid,
    players: &dyn PlayerRepository,
    attributes: &dyn AttributeRepository,
    scoring: &dyn ScoringRepository,
    bounds: ScoreBounds,
) -> Result<PlayerProfile, DomainError> {
    let player = players.get_player(user_id).await?;
    let attributes =
        get_player_attribute_totals(user_id, players, attributes, scoring, bounds).await?;
    Ok(PlayerProfile { player, attributes })
}

/// The attribute catalog sorted by name.
///
/// # Errors
///
/// Propagates storage failures.
pub async fn list_attributes(
    attributes: &dyn AttributeRepository,
) -> Result<Vec<Attribute>, DomainError> {
    attributes.list_attributes().await
}

/// Submitted-choice counts per scenario.
///
/// # Errors
///
/// Propagates storage failures.
pub async fn get_choice_overview(
    stats: &dyn StatisticsRepository,
) -> Result<Vec<ScenarioChoiceStats>, DomainError> {
    stats.choice_overview().await
}

/// Submitted-choice counts per age band and correctness.
///
/// # Errors
///
/// Propagates storage failures.
pub async fn get_age_behavior(
    stats: &dyn StatisticsRepository,
) -> Result<Vec<AgeBandStats>, DomainError> {
    stats.age_behavior().await
}

/// Score totals per attribute across all players.
///
/// # Errors
///
/// Propagates storage failures.
pub async fn get_attribute_impacts(
    stats: &dyn StatisticsRepository,
) -> Result<Vec<AttributeImpact>, DomainError> {
    stats.attribute_impacts().await
}
