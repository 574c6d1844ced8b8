//! A store whose every call fails, for exercising error paths.

use async_trait::async_trait;
use crisis_core::error::DomainError;
use crisis_core::model::{
    AgeBandStats, Attribute, AttributeEffect, AttributeImpact, CatalogBatch, Choice,
    ChoiceAttributeEffect, Level, Player, PlayerAttributeScore, Scenario, ScenarioChoiceStats,
};
use crisis_core::repository::{
    AttributeRepository, CatalogRepository, PlayerRepository, ScenarioRepository,
    ScoringRepository, ScoringTransaction, StatisticsRepository,
};
use uuid::Uuid;

fn refused() -> DomainError {
    DomainError::Storage("connection refused".into())
}

/// A game store that always returns a storage error.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingGameStore;

#[async_trait]
impl ScenarioRepository for FailingGameStore {
    async fn get_level(&self, _level_id: Uuid) -> Result<Level, DomainError> {
        Err(refused())
    }

    async fn list_levels(&self) -> Result<Vec<Level>, DomainError> {
        Err(refused())
    }

    async fn list_level_scenarios(&self, _level_id: Uuid) -> Result<Vec<Scenario>, DomainError> {
        Err(refused())
    }

    async fn get_scenario(&self, _scenario_id: Uuid) -> Result<Scenario, DomainError> {
        Err(refused())
    }

    async fn get_choices_for_scenario(
        &self,
        _scenario_id: Uuid,
    ) -> Result<Vec<Choice>, DomainError> {
        Err(refused())
    }

    async fn get_choice(&self, _choice_id: Uuid) -> Result<Choice, DomainError> {
        Err(refused())
    }
}

#[async_trait]
impl AttributeRepository for FailingGameStore {
    async fn get_attribute(&self, _attribute_id: Uuid) -> Result<Attribute, DomainError> {
        Err(refused())
    }

    async fn list_attributes(&self) -> Result<Vec<Attribute>, DomainError> {
        Err(refused())
    }
}

#[async_trait]
impl PlayerRepository for FailingGameStore {
    async fn insert_player(&self, _player: &Player) -> Result<(), DomainError> {
        Err(refused())
    }

    async fn get_player(&self, _user_id: Uuid) -> Result<Player, DomainError> {
        Err(refused())
    }
}

#[async_trait]
impl ScoringRepository for FailingGameStore {
    async fn effects_for_choice(
        &self,
        _choice_id: Uuid,
    ) -> Result<Vec<AttributeEffect>, DomainError> {
        Err(refused())
    }

    async fn upsert_choice_effect(
        &self,
        _effect: &ChoiceAttributeEffect,
    ) -> Result<(), DomainError> {
        Err(refused())
    }

    async fn scores_for_player(
        &self,
        _user_id: Uuid,
    ) -> Result<Vec<PlayerAttributeScore>, DomainError> {
        Err(refused())
    }

    async fn begin(&self) -> Result<Box<dyn ScoringTransaction>, DomainError> {
        Err(refused())
    }
}

#[async_trait]
impl StatisticsRepository for FailingGameStore {
    async fn choice_overview(&self) -> Result<Vec<ScenarioChoiceStats>, DomainError> {
        Err(refused())
    }

    async fn age_behavior(&self) -> Result<Vec<AgeBandStats>, DomainError> {
        Err(refused())
    }

    async fn attribute_impacts(&self) -> Result<Vec<AttributeImpact>, DomainError> {
        Err(refused())
    }
}

#[async_trait]
impl CatalogRepository for FailingGameStore {
    async fn import_catalog(&self, _batch: &CatalogBatch) -> Result<(), DomainError> {
        Err(refused())
    }
}
