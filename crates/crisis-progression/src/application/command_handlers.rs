//! Command handlers for the progression context.
//!
//! Loading a level into a session is the only step that touches storage;
//! everything after that runs on the in-memory [`PlayerSession`].

use crisis_core::command::Command;
use crisis_core::error::DomainError;
use crisis_core::repository::{PlayerRepository, ScenarioRepository};
use tracing::{info, instrument, warn};

use crate::domain::commands::StartSession;
use crate::domain::session::{PlayerSession, ScenarioStep};

/// Handles the `StartSession` command: verifies the player and level exist,
/// loads the level's scenarios in order with their choices, and starts a
/// session on the first scenario.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the player or level does not exist,
/// `DomainError::Validation` if a scenario offers fewer than `min_choices`
/// choices, `DomainError::EmptySequence` if the level has no scenarios, and
/// propagates storage failures.
#[instrument(skip(command, players, scenarios), fields(command_type = command.command_type(), level_id = %command.level_id))]
pub async fn handle_start_session(
    command: &StartSession,
    players: &dyn PlayerRepository,
    scenarios: &dyn ScenarioRepository,
    min_choices: usize,
) -> Result<PlayerSession, DomainError> {
    players.get_player(command.user_id).await?;
    scenarios.get_level(command.level_id).await?;

    let level_scenarios = scenarios.list_level_scenarios(command.level_id).await?;
    let mut steps = Vec::with_capacity(level_scenarios.len());
    for scenario in level_scenarios {
        let choices = scenarios.get_choices_for_scenario(scenario.id).await?;
        if choices.len() < min_choices {
            warn!(scenario_id = %scenario.id, choices = choices.len(), "scenario has too few choices");
            return Err(DomainError::Validation(format!(
                "scenario {} offers {} choices, at least {min_choices} required",
                scenario.id,
                choices.len()
            )));
        }
        steps.push(ScenarioStep { scenario, choices });
    }

    let session = PlayerSession::start(command.user_id, command.level_id, steps)?;
    info!(
        correlation_id = %command.correlation_id,
        session_id = %session.id(),
        scenarios = session.len(),
        "session started"
    );
    Ok(session)
}

#[cfg(test)]
mod tests {
    use crisis_core::error::DomainError;
    use crisis_core::model::{Level, Scenario};
    use crisis_test_support::{FailingGameStore, GameFixture};
    use uuid::Uuid;

    use super::handle_start_session;
    use crate::domain::commands::StartSession;

    fn command(fixture: &GameFixture) -> StartSession {
        StartSession {
            correlation_id: Uuid::new_v4(),
            user_id: fixture.player.user_id,
            level_id: fixture.level.id,
        }
    }

    #[tokio::test]
    async fn test_handle_start_session_loads_scenarios_in_order() {
        // Arrange
        let fixture = GameFixture::new();

        // Act
        let session = handle_start_session(&command(&fixture), &fixture.store, &fixture.store, 2)
            .await
            .unwrap();

        // Assert
        assert_eq!(session.len(), 3);
        assert_eq!(session.user_id(), fixture.player.user_id);
        assert_eq!(session.level_id(), fixture.level.id);
        let current = session.current().unwrap();
        assert_eq!(current.scenario, fixture.scenarios[0]);
        assert_eq!(current.choices.len(), 2);
    }

    #[tokio::test]
    async fn test_handle_start_session_rejects_unknown_player() {
        // Arrange
        let fixture = GameFixture::new();
        let mut cmd = command(&fixture);
        cmd.user_id = Uuid::new_v4();

        // Act
        let result = handle_start_session(&cmd, &fixture.store, &fixture.store, 2).await;

        // Assert
        match result {
            Err(DomainError::NotFound { entity, id }) => {
                assert_eq!(entity, "player");
                assert_eq!(id, cmd.user_id);
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_handle_start_session_rejects_unknown_level() {
        let fixture = GameFixture::new();
        let mut cmd = command(&fixture);
        cmd.level_id = Uuid::new_v4();

        let result = handle_start_session(&cmd, &fixture.store, &fixture.store, 2).await;

        assert!(matches!(
            result,
            Err(DomainError::NotFound { entity: "level", .. })
        ));
    }

    #[tokio::test]
    async fn test_handle_start_session_on_empty_level_is_empty_sequence() {
        // Arrange
        let fixture = GameFixture::new();
        let empty = Level {
            id: Uuid::new_v4(),
            level_number: 2,
            title: "Empty".to_owned(),
        };
        fixture.store.add_level(empty.clone());
        let mut cmd = command(&fixture);
        cmd.level_id = empty.id;

        // Act
        let result = handle_start_session(&cmd, &fixture.store, &fixture.store, 2).await;

        // Assert
        assert!(matches!(result, Err(DomainError::EmptySequence)));
    }

    #[tokio::test]
    async fn test_handle_start_session_rejects_scenario_with_too_few_choices() {
        // Arrange
        let fixture = GameFixture::new();
        fixture.store.add_scenario(Scenario {
            id: Uuid::new_v4(),
            level_id: fixture.level.id,
            ordinal_position: 4,
            prompt_text: "No options here.".to_owned(),
        });

        // Act
        let result = handle_start_session(&command(&fixture), &fixture.store, &fixture.store, 2).await;

        // Assert
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn test_handle_start_session_propagates_storage_errors() {
        let fixture = GameFixture::new();

        let result =
            handle_start_session(&command(&fixture), &FailingGameStore, &FailingGameStore, 2).await;

        assert!(matches!(result, Err(DomainError::Storage(_))));
    }
}
