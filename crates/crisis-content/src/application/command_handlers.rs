//! Command handlers for the content context.

use std::collections::HashMap;

use crisis_core::command::Command;
use crisis_core::error::DomainError;
use crisis_core::model::{
    Attribute, CatalogBatch, Choice, ChoiceAttributeEffect, Level, Scenario,
};
use crisis_core::repository::{AttributeRepository, CatalogRepository, ScenarioRepository};
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::commands::ImportScenarioPack;
use crate::domain::pack::{ScenarioPack, parse_pack};

/// Row counts written by an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Attributes created. Attributes reused from the catalog are not counted.
    pub attributes: usize,
    /// Levels created.
    pub levels: usize,
    /// Scenarios created.
    pub scenarios: usize,
    /// Choices created.
    pub choices: usize,
    /// Choice to attribute links created.
    pub effects: usize,
}

/// Handles the `ImportScenarioPack` command.
///
/// Attributes are matched by name: names already in the catalog are reused,
/// the rest are created. Ids are time-ordered so that listing by id returns
/// rows in pack order.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the pack is malformed, reuses an
/// existing level number, or references an attribute that is neither
/// defined in the pack nor present in the catalog. Propagates storage
/// failures; nothing is written unless the whole pack is.
#[instrument(skip(command, scenarios, attributes, catalog), fields(command_type = command.command_type()))]
pub async fn handle_import_pack(
    command: &ImportScenarioPack,
    scenarios: &dyn ScenarioRepository,
    attributes: &dyn AttributeRepository,
    catalog: &dyn CatalogRepository,
) -> Result<ImportSummary, DomainError> {
    let pack = parse_pack(&command.source)?;

    let existing_levels = scenarios.list_levels().await?;
    if let Some(clash) = pack
        .levels
        .iter()
        .find(|l| existing_levels.iter().any(|e| e.level_number == l.number))
    {
        warn!(level_number = clash.number, "scenario pack reuses an existing level number");
        return Err(DomainError::Validation(format!(
            "level {} already exists",
            clash.number
        )));
    }

    let existing_attributes = attributes.list_attributes().await?;
    let batch = build_batch(&pack, &existing_attributes)?;
    catalog.import_catalog(&batch).await?;

    let summary = ImportSummary {
        attributes: batch.attributes.len(),
        levels: batch.levels.len(),
        scenarios: batch.scenarios.len(),
        choices: batch.choices.len(),
        effects: batch.effects.len(),
    };
    info!(
        correlation_id = %command.correlation_id,
        levels = summary.levels,
        scenarios = summary.scenarios,
        choices = summary.choices,
        "scenario pack imported"
    );
    Ok(summary)
}

fn build_batch(pack: &ScenarioPack, existing: &[Attribute]) -> Result<CatalogBatch, DomainError> {
    let mut batch = CatalogBatch::default();
    let mut by_name: HashMap<&str, Uuid> =
        existing.iter().map(|a| (a.name.as_str(), a.id)).collect();

    for attribute in &pack.attributes {
        if by_name.contains_key(attribute.name.as_str()) {
            continue;
        }
        let created = Attribute {
            id: Uuid::now_v7(),
            name: attribute.name.clone(),
            description: attribute.description.clone(),
        };
        by_name.insert(attribute.name.as_str(), created.id);
        batch.attributes.push(created);
    }

    if let Some(unknown) = pack
        .referenced_attributes()
        .find(|name| !by_name.contains_key(name))
    {
        return Err(DomainError::Validation(format!(
            "effect references unknown attribute '{unknown}'"
        )));
    }

    for pack_level in &pack.levels {
        let level = Level {
            id: Uuid::now_v7(),
            level_number: pack_level.number,
            title: pack_level.title.clone(),
        };
        for (ordinal_position, pack_scenario) in (1..).zip(&pack_level.scenarios) {
            let scenario = Scenario {
                id: Uuid::now_v7(),
                level_id: level.id,
                ordinal_position,
                prompt_text: pack_scenario.prompt.clone(),
            };
            for pack_choice in &pack_scenario.choices {
                let choice = Choice {
                    id: Uuid::now_v7(),
                    scenario_id: scenario.id,
                    option_text: pack_choice.option.clone(),
                    outcome_text: pack_choice.outcome.clone(),
                    correctness: pack_choice.correctness,
                };
                for (name, &delta) in &pack_choice.effects {
                    batch.effects.push(ChoiceAttributeEffect {
                        choice_id: choice.id,
                        attribute_id: by_name[name.as_str()],
                        delta,
                    });
                }
                batch.choices.push(choice);
            }
            batch.scenarios.push(scenario);
        }
        batch.levels.push(level);
    }

    Ok(batch)
}

#[cfg(test)]
mod tests {
    use crisis_core::error::DomainError;
    use crisis_core::model::Correctness;
    use crisis_core::repository::{AttributeRepository, ScenarioRepository, ScoringRepository};
    use crisis_test_support::{FailingGameStore, GameFixture, InMemoryGameStore};
    use uuid::Uuid;

    use super::*;

    const DAY_ONE: &str = include_str!("../../packs/crisis_day_one.yaml");

    fn command(source: &str) -> ImportScenarioPack {
        ImportScenarioPack {
            correlation_id: Uuid::new_v4(),
            source: source.to_owned(),
        }
    }

    #[tokio::test]
    async fn test_import_bundled_pack_into_empty_catalog() {
        // Arrange
        let store = InMemoryGameStore::new();

        // Act
        let summary = handle_import_pack(&command(DAY_ONE), &store, &store, &store)
            .await
            .unwrap();

        // Assert
        assert_eq!(summary.attributes, 8);
        assert_eq!(summary.levels, 1);
        assert_eq!(summary.scenarios, 3);
        assert_eq!(summary.choices, 6);

        let levels = store.list_levels().await.unwrap();
        assert_eq!(levels[0].title, "Krisens första dag");
        let scenarios = store.list_level_scenarios(levels[0].id).await.unwrap();
        let positions: Vec<i32> = scenarios.iter().map(|s| s.ordinal_position).collect();
        assert_eq!(positions, vec![1, 2, 3]);

        let choices = store.get_choices_for_scenario(scenarios[0].id).await.unwrap();
        assert_eq!(choices[0].correctness, Correctness::Good);
        let effects = store.effects_for_choice(choices[0].id).await.unwrap();
        assert!(!effects.is_empty());
    }

    #[tokio::test]
    async fn test_import_reuses_existing_attributes_by_name() {
        // Arrange
        let fixture = GameFixture::new();
        let source = r"
attributes:
  - name: lojal
    description: Redefined.
levels:
  - number: 7
    title: Aftermath
    scenarios:
      - prompt: Your neighbour knocks.
        choices:
          - option: Open the door.
            correctness: good
            effects:
              lojal: 3
              moralisk: 1
";

        // Act
        let summary = handle_import_pack(&command(source), &fixture.store, &fixture.store, &fixture.store)
            .await
            .unwrap();

        // Assert
        assert_eq!(summary.attributes, 0);
        assert_eq!(summary.effects, 2);
        assert_eq!(fixture.store.list_attributes().await.unwrap().len(), 3);
        let lojal = fixture.attribute("lojal");
        assert!(
            fixture
                .store
                .effects()
                .iter()
                .any(|e| e.attribute_id == lojal.id && e.delta == 3)
        );
    }

    #[tokio::test]
    async fn test_import_rejects_existing_level_number() {
        // Arrange
        let fixture = GameFixture::new();
        let source = r"
levels:
  - number: 1
    title: Clash
    scenarios: []
";

        // Act
        let result =
            handle_import_pack(&command(source), &fixture.store, &fixture.store, &fixture.store).await;

        // Assert
        match result {
            Err(DomainError::Validation(message)) => assert!(message.contains("level 1")),
            other => panic!("expected Validation, got {other:?}"),
        }
        assert_eq!(fixture.store.list_levels().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_import_rejects_unknown_effect_attribute_and_writes_nothing() {
        // Arrange
        let store = InMemoryGameStore::new();
        let source = r"
attributes:
  - name: lojal
levels:
  - number: 1
    title: A
    scenarios:
      - prompt: Pick one.
        choices:
          - option: This.
            correctness: neutral
            effects:
              modig: 2
";

        // Act
        let result = handle_import_pack(&command(source), &store, &store, &store).await;

        // Assert
        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert!(store.list_attributes().await.unwrap().is_empty());
        assert!(store.list_levels().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_import_propagates_storage_errors() {
        let result = handle_import_pack(
            &command(DAY_ONE),
            &FailingGameStore,
            &FailingGameStore,
            &FailingGameStore,
        )
        .await;

        assert!(matches!(result, Err(DomainError::Storage(_))));
    }
}
