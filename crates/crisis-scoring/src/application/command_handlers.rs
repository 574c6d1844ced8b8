//! Command handlers for the scoring context.
//!
//! Score writes go through a [`ScoringTransaction`]: every effect of one
//! choice, and the choice record that caused them, commit together or not
//! at all.

use crisis_core::clock::Clock;
use crisis_core::command::Command;
use crisis_core::error::DomainError;
use crisis_core::model::{AttributeEffect, ChoiceAttributeEffect, Player, PlayerChoiceRecord};
use crisis_core::policy::ScoreBounds;
use crisis_core::repository::{
    AttributeRepository, PlayerRepository, ScenarioRepository, ScoringRepository,
    ScoringTransaction,
};
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::commands::{
    ApplyChoiceEffects, LinkChoiceToAttribute, RecordChoice, RegisterPlayer,
};
use crate::domain::registration;

/// A player's score on one attribute after a choice was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreChange {
    /// The attribute that moved.
    pub attribute_id: Uuid,
    /// The delta applied.
    pub delta: i64,
    /// The new total, with bounds applied.
    pub score: i64,
}

/// Result of a successfully recorded choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceRecorded {
    /// The appended audit entry.
    pub record: PlayerChoiceRecord,
    /// Every score the choice moved.
    pub score_changes: Vec<ScoreChange>,
}

async fn apply_effects(
    tx: &mut dyn ScoringTransaction,
    user_id: Uuid,
    effects: &[AttributeEffect],
    bounds: ScoreBounds,
) -> Result<Vec<ScoreChange>, DomainError> {
    let mut changes = Vec::with_capacity(effects.len());
    for effect in effects {
        let raw = tx
            .increment_score(user_id, effect.attribute_id, effect.delta)
            .await?;
        changes.push(ScoreChange {
            attribute_id: effect.attribute_id,
            delta: effect.delta,
            score: bounds.apply(raw),
        });
    }
    Ok(changes)
}

/// Commits `tx` if `outcome` succeeded, otherwise rolls it back and returns
/// the triggering error.
async fn settle<T>(
    tx: Box<dyn ScoringTransaction>,
    outcome: Result<T, DomainError>,
) -> Result<T, DomainError> {
    match outcome {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            warn!(error = %err, "rolling back scoring transaction");
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    }
}

/// Handles the `ApplyChoiceEffects` command: adds every effect of the choice
/// to the player's running totals in one transaction.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the player or choice does not exist and
/// `DomainError::Storage` if any write fails, in which case no effect of the
/// choice is applied.
#[instrument(skip_all, fields(command_type = command.command_type(), user_id = %command.user_id, choice_id = %command.choice_id))]
pub async fn handle_apply_choice_effects(
    command: &ApplyChoiceEffects,
    players: &dyn PlayerRepository,
    scenarios: &dyn ScenarioRepository,
    scoring: &dyn ScoringRepository,
    bounds: ScoreBounds,
) -> Result<Vec<ScoreChange>, DomainError> {
    players.get_player(command.user_id).await?;
    scenarios.get_choice(command.choice_id).await?;
    let effects = scoring.effects_for_choice(command.choice_id).await?;

    let mut tx = scoring.begin().await?;
    let outcome = apply_effects(&mut *tx, command.user_id, &effects, bounds).await;
    let changes = settle(tx, outcome).await?;

    info!(
        correlation_id = %command.correlation_id,
        effects = changes.len(),
        "choice effects applied"
    );
    Ok(changes)
}

/// Handles the `RecordChoice` command: appends the choice record and applies
/// the choice's effects as one unit of work.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the player, level, scenario or choice
/// does not exist and `DomainError::Storage` if any write fails, in which
/// case neither the record nor any score change persists.
#[instrument(skip_all, fields(command_type = command.command_type(), user_id = %command.user_id, choice_id = %command.choice_id))]
pub async fn handle_record_choice(
    command: &RecordChoice,
    clock: &dyn Clock,
    players: &dyn PlayerRepository,
    scenarios: &dyn ScenarioRepository,
    scoring: &dyn ScoringRepository,
    bounds: ScoreBounds,
) -> Result<ChoiceRecorded, DomainError> {
    players.get_player(command.user_id).await?;
    scenarios.get_level(command.level_id).await?;
    scenarios.get_scenario(command.scenario_id).await?;
    scenarios.get_choice(command.choice_id).await?;
    let effects = scoring.effects_for_choice(command.choice_id).await?;

    let record = PlayerChoiceRecord {
        id: Uuid::new_v4(),
        user_id: command.user_id,
        level_id: command.level_id,
        scenario_id: command.scenario_id,
        choice_id: command.choice_id,
        chosen_at: clock.now(),
    };

    let mut tx = scoring.begin().await?;
    let outcome = match tx.append_choice_record(&record).await {
        Ok(()) => apply_effects(&mut *tx, command.user_id, &effects, bounds).await,
        Err(err) => Err(err),
    };
    let score_changes = settle(tx, outcome).await?;

    info!(
        correlation_id = %command.correlation_id,
        record_id = %record.id,
        effects = score_changes.len(),
        "choice recorded"
    );
    Ok(ChoiceRecorded {
        record,
        score_changes,
    })
}

/// Handles the `LinkChoiceToAttribute` command: creates the effect edge, or
/// overwrites its delta if the edge already exists.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the choice or attribute does not exist
/// and propagates storage failures.
#[instrument(skip_all, fields(command_type = command.command_type(), choice_id = %command.choice_id, attribute_id = %command.attribute_id))]
pub async fn handle_link_choice_to_attribute(
    command: &LinkChoiceToAttribute,
    scenarios: &dyn ScenarioRepository,
    attributes: &dyn AttributeRepository,
    scoring: &dyn ScoringRepository,
) -> Result<ChoiceAttributeEffect, DomainError> {
    scenarios.get_choice(command.choice_id).await?;
    attributes.get_attribute(command.attribute_id).await?;

    let effect = ChoiceAttributeEffect {
        choice_id: command.choice_id,
        attribute_id: command.attribute_id,
        delta: command.delta,
    };
    scoring.upsert_choice_effect(&effect).await?;

    info!(correlation_id = %command.correlation_id, delta = command.delta, "choice linked to attribute");
    Ok(effect)
}

/// Handles the `RegisterPlayer` command.
///
/// # Errors
///
/// Returns `DomainError::Validation` for invalid registration data and
/// propagates storage failures.
#[instrument(skip_all, fields(command_type = command.command_type()))]
pub async fn handle_register_player(
    command: &RegisterPlayer,
    clock: &dyn Clock,
    players: &dyn PlayerRepository,
) -> Result<Player, DomainError> {
    let player = registration::new_player(command, clock.now())?;
    players.insert_player(&player).await?;

    info!(correlation_id = %command.correlation_id, user_id = %player.user_id, "player registered");
    Ok(player)
}

#[cfg(test)]
mod tests {
    use crisis_test_support::{
        FailingGameStore, FixedClock, GameFixture, InMemoryGameStore, fixed_now,
    };

    use super::*;

    async fn link(fixture: &GameFixture, choice_id: Uuid, attribute: &str, delta: i64) {
        let command = LinkChoiceToAttribute {
            correlation_id: Uuid::new_v4(),
            choice_id,
            attribute_id: fixture.attribute(attribute).id,
            delta,
        };
        handle_link_choice_to_attribute(&command, &fixture.store, &fixture.store, &fixture.store)
            .await
            .unwrap();
    }

    fn record_command(fixture: &GameFixture, scenario: usize, good: bool) -> RecordChoice {
        let (g, b) = &fixture.choices[scenario];
        RecordChoice {
            correlation_id: Uuid::new_v4(),
            user_id: fixture.player.user_id,
            level_id: fixture.level.id,
            scenario_id: fixture.scenarios[scenario].id,
            choice_id: if good { g.id } else { b.id },
        }
    }

    fn apply_command(fixture: &GameFixture, choice_id: Uuid) -> ApplyChoiceEffects {
        ApplyChoiceEffects {
            correlation_id: Uuid::new_v4(),
            user_id: fixture.player.user_id,
            choice_id,
        }
    }

    #[tokio::test]
    async fn test_apply_choice_effects_accumulates_across_choices() {
        // Arrange
        let fixture = GameFixture::new();
        let first = fixture.choices[0].0.id;
        let second = fixture.choices[1].1.id;
        link(&fixture, first, "taktisk", 5).await;
        link(&fixture, second, "taktisk", -2).await;
        let s = &fixture.store;

        // Act
        handle_apply_choice_effects(&apply_command(&fixture, first), s, s, s, ScoreBounds::unbounded())
            .await
            .unwrap();
        let changes = handle_apply_choice_effects(
            &apply_command(&fixture, second),
            s,
            s,
            s,
            ScoreBounds::unbounded(),
        )
        .await
        .unwrap();

        // Assert
        let taktisk = fixture.attribute("taktisk").id;
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].score, 3);
        assert_eq!(fixture.store.score(fixture.player.user_id, taktisk), Some(3));
    }

    #[tokio::test]
    async fn test_apply_choice_effects_without_effects_is_a_no_op() {
        let fixture = GameFixture::new();
        let s = &fixture.store;

        let changes = handle_apply_choice_effects(
            &apply_command(&fixture, fixture.choices[0].0.id),
            s,
            s,
            s,
            ScoreBounds::unbounded(),
        )
        .await
        .unwrap();

        assert!(changes.is_empty());
        assert!(s.scores_for_player(fixture.player.user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_apply_choice_effects_is_all_or_nothing_on_failure() {
        // Arrange
        let fixture = GameFixture::load_into(InMemoryGameStore::new().fail_on_increment(2));
        let choice = fixture.choices[0].0.id;
        link(&fixture, choice, "lojal", 3).await;
        link(&fixture, choice, "moralisk", -1).await;
        let s = &fixture.store;

        // Act
        let result = handle_apply_choice_effects(
            &apply_command(&fixture, choice),
            s,
            s,
            s,
            ScoreBounds::unbounded(),
        )
        .await;

        // Assert
        assert!(matches!(result, Err(DomainError::Storage(_))));
        let user = fixture.player.user_id;
        assert_eq!(s.score(user, fixture.attribute("lojal").id), None);
        assert_eq!(s.score(user, fixture.attribute("moralisk").id), None);
    }

    #[tokio::test]
    async fn test_apply_choice_effects_for_unknown_player_is_not_found() {
        let fixture = GameFixture::new();
        let mut command = apply_command(&fixture, fixture.choices[0].0.id);
        command.user_id = Uuid::new_v4();
        let s = &fixture.store;

        let result = handle_apply_choice_effects(&command, s, s, s, ScoreBounds::unbounded()).await;

        assert!(matches!(
            result,
            Err(DomainError::NotFound { entity: "player", .. })
        ));
    }

    #[tokio::test]
    async fn test_apply_choice_effects_reports_bounded_scores() {
        // Arrange
        let fixture = GameFixture::new();
        let choice = fixture.choices[0].1.id;
        link(&fixture, choice, "taktisk", -4).await;
        let s = &fixture.store;

        // Act
        let changes = handle_apply_choice_effects(
            &apply_command(&fixture, choice),
            s,
            s,
            s,
            ScoreBounds::floored_at(0),
        )
        .await
        .unwrap();

        // Assert
        assert_eq!(changes[0].score, 0);
        assert_eq!(
            s.score(fixture.player.user_id, fixture.attribute("taktisk").id),
            Some(-4)
        );
    }

    #[tokio::test]
    async fn test_link_choice_to_attribute_twice_keeps_one_edge() {
        // Arrange
        let fixture = GameFixture::new();
        let choice = fixture.choices[0].0.id;

        // Act
        link(&fixture, choice, "taktisk", 5).await;
        link(&fixture, choice, "taktisk", 5).await;

        // Assert
        let taktisk = fixture.attribute("taktisk").id;
        let edges: Vec<ChoiceAttributeEffect> = fixture
            .store
            .effects()
            .into_iter()
            .filter(|e| e.choice_id == choice && e.attribute_id == taktisk)
            .collect();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].delta, 5);
    }

    #[tokio::test]
    async fn test_link_choice_to_attribute_overwrites_delta() {
        let fixture = GameFixture::new();
        let choice = fixture.choices[0].0.id;

        link(&fixture, choice, "lojal", 2).await;
        link(&fixture, choice, "lojal", -7).await;

        let effects = fixture.store.effects_for_choice(choice).await.unwrap();
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].delta, -7);
    }

    #[tokio::test]
    async fn test_link_choice_to_unknown_attribute_is_not_found() {
        let fixture = GameFixture::new();
        let command = LinkChoiceToAttribute {
            correlation_id: Uuid::new_v4(),
            choice_id: fixture.choices[0].0.id,
            attribute_id: Uuid::new_v4(),
            delta: 1,
        };
        let s = &fixture.store;

        let result = handle_link_choice_to_attribute(&command, s, s, s).await;

        assert!(matches!(
            result,
            Err(DomainError::NotFound { entity: "attribute", .. })
        ));
        assert!(s.effects().is_empty());
    }

    #[tokio::test]
    async fn test_record_choice_appends_record_and_updates_scores() {
        // Arrange
        let fixture = GameFixture::new();
        let command = record_command(&fixture, 0, true);
        link(&fixture, command.choice_id, "taktisk", 4).await;
        let clock = FixedClock(fixed_now());
        let s = &fixture.store;

        // Act
        let recorded = handle_record_choice(&command, &clock, s, s, s, ScoreBounds::unbounded())
            .await
            .unwrap();

        // Assert
        assert_eq!(recorded.record.choice_id, command.choice_id);
        assert_eq!(recorded.record.scenario_id, command.scenario_id);
        assert_eq!(recorded.record.chosen_at, fixed_now());
        assert_eq!(s.choice_records(), vec![recorded.record.clone()]);
        assert_eq!(recorded.score_changes.len(), 1);
        assert_eq!(recorded.score_changes[0].score, 4);
    }

    #[tokio::test]
    async fn test_record_choice_rolls_back_record_when_scoring_fails() {
        // Arrange
        let fixture = GameFixture::load_into(InMemoryGameStore::new().fail_on_increment(1));
        let command = record_command(&fixture, 1, false);
        link(&fixture, command.choice_id, "moralisk", -3).await;
        let clock = FixedClock(fixed_now());
        let s = &fixture.store;

        // Act
        let result = handle_record_choice(&command, &clock, s, s, s, ScoreBounds::unbounded()).await;

        // Assert
        assert!(matches!(result, Err(DomainError::Storage(_))));
        assert!(s.choice_records().is_empty());
        assert_eq!(
            s.score(fixture.player.user_id, fixture.attribute("moralisk").id),
            None
        );
    }

    #[tokio::test]
    async fn test_record_choice_for_unknown_scenario_is_not_found() {
        let fixture = GameFixture::new();
        let mut command = record_command(&fixture, 0, true);
        command.scenario_id = Uuid::new_v4();
        let clock = FixedClock(fixed_now());
        let s = &fixture.store;

        let result = handle_record_choice(&command, &clock, s, s, s, ScoreBounds::unbounded()).await;

        assert!(matches!(
            result,
            Err(DomainError::NotFound { entity: "scenario", .. })
        ));
        assert!(s.choice_records().is_empty());
    }

    #[tokio::test]
    async fn test_register_player_persists_validated_player() {
        // Arrange
        let store = InMemoryGameStore::new();
        let clock = FixedClock(fixed_now());
        let command = RegisterPlayer {
            correlation_id: Uuid::new_v4(),
            firstname: "Maja".to_owned(),
            lastname: "Berg".to_owned(),
            age: 27,
            crisis_ready: Some(false),
        };

        // Act
        let player = handle_register_player(&command, &clock, &store).await.unwrap();

        // Assert
        let stored = store.get_player(player.user_id).await.unwrap();
        assert_eq!(stored, player);
        assert_eq!(stored.created_at, fixed_now());
    }

    #[tokio::test]
    async fn test_register_player_propagates_storage_errors() {
        let clock = FixedClock(fixed_now());
        let command = RegisterPlayer {
            correlation_id: Uuid::new_v4(),
            firstname: "Maja".to_owned(),
            lastname: "Berg".to_owned(),
            age: 27,
            crisis_ready: None,
        };

        let result = handle_register_player(&command, &clock, &FailingGameStore).await;

        assert!(matches!(result, Err(DomainError::Storage(_))));
    }
}
