//! Storage abstractions consumed by the engines.
//!
//! Lookups of a single entity return `DomainError::NotFound` when the id
//! does not resolve; list queries return an empty `Vec` instead.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DomainError;
use crate::model::{
    AgeBandStats, Attribute, AttributeEffect, AttributeImpact, CatalogBatch, Choice,
    ChoiceAttributeEffect, Level, Player, PlayerAttributeScore, PlayerChoiceRecord, Scenario,
    ScenarioChoiceStats,
};

/// Read access to levels, scenarios and their choices.
#[async_trait]
pub trait ScenarioRepository: Send + Sync {
    /// Load a level by id.
    async fn get_level(&self, level_id: Uuid) -> Result<Level, DomainError>;

    /// All levels ordered by `level_number`.
    async fn list_levels(&self) -> Result<Vec<Level>, DomainError>;

    /// Scenarios of a level ordered by `ordinal_position`.
    async fn list_level_scenarios(&self, level_id: Uuid) -> Result<Vec<Scenario>, DomainError>;

    /// Load a scenario by id.
    async fn get_scenario(&self, scenario_id: Uuid) -> Result<Scenario, DomainError>;

    /// Choices offered by a scenario, in a stable order.
    async fn get_choices_for_scenario(&self, scenario_id: Uuid)
    -> Result<Vec<Choice>, DomainError>;

    /// Load a choice by id.
    async fn get_choice(&self, choice_id: Uuid) -> Result<Choice, DomainError>;
}

/// Read access to the attribute catalog.
#[async_trait]
pub trait AttributeRepository: Send + Sync {
    /// Load an attribute by id.
    async fn get_attribute(&self, attribute_id: Uuid) -> Result<Attribute, DomainError>;

    /// Every attribute in the catalog.
    async fn list_attributes(&self) -> Result<Vec<Attribute>, DomainError>;
}

/// Player registration storage.
#[async_trait]
pub trait PlayerRepository: Send + Sync {
    /// Persist a newly registered player.
    async fn insert_player(&self, player: &Player) -> Result<(), DomainError>;

    /// Load a player by id.
    async fn get_player(&self, user_id: Uuid) -> Result<Player, DomainError>;
}

/// Choice-effect catalog and per-player score storage.
#[async_trait]
pub trait ScoringRepository: Send + Sync {
    /// Effects linked to a choice. Empty when the choice has none.
    async fn effects_for_choice(&self, choice_id: Uuid)
    -> Result<Vec<AttributeEffect>, DomainError>;

    /// Insert the `(choice_id, attribute_id)` edge, or overwrite its delta.
    async fn upsert_choice_effect(&self, effect: &ChoiceAttributeEffect)
    -> Result<(), DomainError>;

    /// Stored score rows for a player. Attributes never touched are absent.
    async fn scores_for_player(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<PlayerAttributeScore>, DomainError>;

    /// Open a unit of work for choice recording and score updates.
    async fn begin(&self) -> Result<Box<dyn ScoringTransaction>, DomainError>;
}

/// A scoped unit of work over the choice log and score table.
///
/// Nothing written through a transaction is visible to other readers until
/// [`commit`](ScoringTransaction::commit). Dropping a transaction without
/// committing discards its writes.
#[async_trait]
pub trait ScoringTransaction: Send {
    /// Append a choice record to the audit log.
    async fn append_choice_record(&mut self, record: &PlayerChoiceRecord)
    -> Result<(), DomainError>;

    /// Atomically add `delta` to the `(user_id, attribute_id)` score,
    /// inserting the row with `score = delta` if absent. Returns the new raw
    /// total.
    async fn increment_score(
        &mut self,
        user_id: Uuid,
        attribute_id: Uuid,
        delta: i64,
    ) -> Result<i64, DomainError>;

    /// Make every write of this unit visible.
    async fn commit(self: Box<Self>) -> Result<(), DomainError>;

    /// Discard every write of this unit.
    async fn rollback(self: Box<Self>) -> Result<(), DomainError>;
}

/// Aggregate queries backing the statistics dashboard.
#[async_trait]
pub trait StatisticsRepository: Send + Sync {
    /// Submitted-choice counts per scenario, split by correctness.
    async fn choice_overview(&self) -> Result<Vec<ScenarioChoiceStats>, DomainError>;

    /// Submitted-choice counts per ten-year age band and correctness.
    async fn age_behavior(&self) -> Result<Vec<AgeBandStats>, DomainError>;

    /// Score totals per attribute across all players, highest first.
    async fn attribute_impacts(&self) -> Result<Vec<AttributeImpact>, DomainError>;
}

/// Bulk catalog writes.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Write every row of `batch` in a single transaction.
    async fn import_catalog(&self, batch: &CatalogBatch) -> Result<(), DomainError>;
}
