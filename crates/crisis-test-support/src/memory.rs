//! In-memory game store with real commit/rollback semantics.
//!
//! Every repository trait is implemented over one shared state guarded by a
//! mutex. Scoring transactions buffer their writes and apply them under a
//! single lock on commit, so a failed unit of work leaves no trace.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use crisis_core::error::DomainError;
use crisis_core::model::{
    AgeBandStats, Attribute, AttributeEffect, AttributeImpact, CatalogBatch, Choice,
    ChoiceAttributeEffect, Correctness, Level, Player, PlayerAttributeScore, PlayerChoiceRecord,
    Scenario, ScenarioChoiceStats,
};
use crisis_core::repository::{
    AttributeRepository, CatalogRepository, PlayerRepository, ScenarioRepository,
    ScoringRepository, ScoringTransaction, StatisticsRepository,
};
use uuid::Uuid;

#[derive(Debug, Default)]
struct State {
    levels: Vec<Level>,
    scenarios: Vec<Scenario>,
    choices: Vec<Choice>,
    attributes: Vec<Attribute>,
    effects: Vec<ChoiceAttributeEffect>,
    players: Vec<Player>,
    scores: BTreeMap<(Uuid, Uuid), i64>,
    records: Vec<PlayerChoiceRecord>,
}

/// A game store held entirely in memory.
///
/// Clones share the same underlying state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGameStore {
    state: Arc<Mutex<State>>,
    increments: Arc<AtomicUsize>,
    fail_increment_at: Option<usize>,
}

impl InMemoryGameStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the `n`th `increment_score` call (1-based, counted across all
    /// transactions) fail with `DomainError::Storage`.
    #[must_use]
    pub fn fail_on_increment(mut self, n: usize) -> Self {
        self.fail_increment_at = Some(n);
        self
    }

    /// Adds a level.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn add_level(&self, level: Level) {
        self.state.lock().unwrap().levels.push(level);
    }

    /// Adds a scenario.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn add_scenario(&self, scenario: Scenario) {
        self.state.lock().unwrap().scenarios.push(scenario);
    }

    /// Adds a choice.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn add_choice(&self, choice: Choice) {
        self.state.lock().unwrap().choices.push(choice);
    }

    /// Adds an attribute.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn add_attribute(&self, attribute: Attribute) {
        self.state.lock().unwrap().attributes.push(attribute);
    }

    /// Adds a player.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn add_player(&self, player: Player) {
        self.state.lock().unwrap().players.push(player);
    }

    /// Snapshot of every committed choice record.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn choice_records(&self) -> Vec<PlayerChoiceRecord> {
        self.state.lock().unwrap().records.clone()
    }

    /// Snapshot of every choice-effect edge.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn effects(&self) -> Vec<ChoiceAttributeEffect> {
        self.state.lock().unwrap().effects.clone()
    }

    /// The committed raw score for `(user_id, attribute_id)`, if a row exists.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn score(&self, user_id: Uuid, attribute_id: Uuid) -> Option<i64> {
        self.state
            .lock()
            .unwrap()
            .scores
            .get(&(user_id, attribute_id))
            .copied()
    }
}

#[async_trait]
impl ScenarioRepository for InMemoryGameStore {
    async fn get_level(&self, level_id: Uuid) -> Result<Level, DomainError> {
        let state = self.state.lock().unwrap();
        state
            .levels
            .iter()
            .find(|l| l.id == level_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("level", level_id))
    }

    async fn list_levels(&self) -> Result<Vec<Level>, DomainError> {
        let mut levels = self.state.lock().unwrap().levels.clone();
        levels.sort_by_key(|l| l.level_number);
        Ok(levels)
    }

    async fn list_level_scenarios(&self, level_id: Uuid) -> Result<Vec<Scenario>, DomainError> {
        let state = self.state.lock().unwrap();
        let mut scenarios: Vec<Scenario> = state
            .scenarios
            .iter()
            .filter(|s| s.level_id == level_id)
            .cloned()
            .collect();
        scenarios.sort_by_key(|s| s.ordinal_position);
        Ok(scenarios)
    }

    async fn get_scenario(&self, scenario_id: Uuid) -> Result<Scenario, DomainError> {
        let state = self.state.lock().unwrap();
        state
            .scenarios
            .iter()
            .find(|s| s.id == scenario_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("scenario", scenario_id))
    }

    async fn get_choices_for_scenario(
        &self,
        scenario_id: Uuid,
    ) -> Result<Vec<Choice>, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .choices
            .iter()
            .filter(|c| c.scenario_id == scenario_id)
            .cloned()
            .collect())
    }

    async fn get_choice(&self, choice_id: Uuid) -> Result<Choice, DomainError> {
        let state = self.state.lock().unwrap();
        state
            .choices
            .iter()
            .find(|c| c.id == choice_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("choice", choice_id))
    }
}

#[async_trait]
impl AttributeRepository for InMemoryGameStore {
    async fn get_attribute(&self, attribute_id: Uuid) -> Result<Attribute, DomainError> {
        let state = self.state.lock().unwrap();
        state
            .attributes
            .iter()
            .find(|a| a.id == attribute_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("attribute", attribute_id))
    }

    async fn list_attributes(&self) -> Result<Vec<Attribute>, DomainError> {
        let mut attributes = self.state.lock().unwrap().attributes.clone();
        attributes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(attributes)
    }
}

#[async_trait]
impl PlayerRepository for InMemoryGameStore {
    async fn insert_player(&self, player: &Player) -> Result<(), DomainError> {
        self.state.lock().unwrap().players.push(player.clone());
        Ok(())
    }

    async fn get_player(&self, user_id: Uuid) -> Result<Player, DomainError> {
        let state = self.state.lock().unwrap();
        state
            .players
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found("player", user_id))
    }
}

#[async_trait]
impl ScoringRepository for InMemoryGameStore {
    async fn effects_for_choice(
        &self,
        choice_id: Uuid,
    ) -> Result<Vec<AttributeEffect>, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .effects
            .iter()
            .filter(|e| e.choice_id == choice_id)
            .map(|e| AttributeEffect {
                attribute_id: e.attribute_id,
                delta: e.delta,
            })
            .collect())
    }

    async fn upsert_choice_effect(
        &self,
        effect: &ChoiceAttributeEffect,
    ) -> Result<(), DomainError> {
        let mut state = self.state.lock().unwrap();
        match state
            .effects
            .iter_mut()
            .find(|e| e.choice_id == effect.choice_id && e.attribute_id == effect.attribute_id)
        {
            Some(existing) => existing.delta = effect.delta,
            None => state.effects.push(*effect),
        }
        Ok(())
    }

    async fn scores_for_player(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<PlayerAttributeScore>, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .scores
            .iter()
            .filter(|((user, _), _)| *user == user_id)
            .map(|(&(user_id, attribute_id), &score)| PlayerAttributeScore {
                user_id,
                attribute_id,
                score,
            })
            .collect())
    }

    async fn begin(&self) -> Result<Box<dyn ScoringTransaction>, DomainError> {
        Ok(Box::new(InMemoryTransaction {
            state: Arc::clone(&self.state),
            increments: Arc::clone(&self.increments),
            fail_increment_at: self.fail_increment_at,
            records: Vec::new(),
            deltas: Vec::new(),
        }))
    }
}

/// Buffered unit of work over an [`InMemoryGameStore`].
#[derive(Debug)]
struct InMemoryTransaction {
    state: Arc<Mutex<State>>,
    increments: Arc<AtomicUsize>,
    fail_increment_at: Option<usize>,
    records: Vec<PlayerChoiceRecord>,
    deltas: Vec<(Uuid, Uuid, i64)>,
}

#[async_trait]
impl ScoringTransaction for InMemoryTransaction {
    async fn append_choice_record(
        &mut self,
        record: &PlayerChoiceRecord,
    ) -> Result<(), DomainError> {
        self.records.push(record.clone());
        Ok(())
    }

    async fn increment_score(
        &mut self,
        user_id: Uuid,
        attribute_id: Uuid,
        delta: i64,
    ) -> Result<i64, DomainError> {
        let call = self.increments.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_increment_at == Some(call) {
            return Err(DomainError::Storage(format!(
                "injected failure on score increment {call}"
            )));
        }

        let committed = self
            .state
            .lock()
            .unwrap()
            .scores
            .get(&(user_id, attribute_id))
            .copied()
            .unwrap_or(0);
        let pending: i64 = self
            .deltas
            .iter()
            .filter(|(u, a, _)| *u == user_id && *a == attribute_id)
            .map(|(_, _, d)| d)
            .sum();

        self.deltas.push((user_id, attribute_id, delta));
        Ok(committed + pending + delta)
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        let mut state = self.state.lock().unwrap();
        state.records.extend(self.records);
        for (user_id, attribute_id, delta) in self.deltas {
            *state.scores.entry((user_id, attribute_id)).or_insert(0) += delta;
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        Ok(())
    }
}

#[async_trait]
impl StatisticsRepository for InMemoryGameStore {
    async fn choice_overview(&self) -> Result<Vec<ScenarioChoiceStats>, DomainError> {
        let state = self.state.lock().unwrap();
        let mut per_scenario: BTreeMap<Uuid, ScenarioChoiceStats> = BTreeMap::new();
        for record in &state.records {
            let Some(choice) = state.choices.iter().find(|c| c.id == record.choice_id) else {
                continue;
            };
            let stats = per_scenario
                .entry(record.scenario_id)
                .or_insert(ScenarioChoiceStats {
                    scenario_id: record.scenario_id,
                    good: 0,
                    bad: 0,
                    neutral: 0,
                });
            match choice.correctness {
                Correctness::Good => stats.good += 1,
                Correctness::Bad => stats.bad += 1,
                Correctness::Neutral => stats.neutral += 1,
            }
        }
        Ok(per_scenario.into_values().collect())
    }

    async fn age_behavior(&self) -> Result<Vec<AgeBandStats>, DomainError> {
        let state = self.state.lock().unwrap();
        let mut counts: BTreeMap<(i32, &'static str), (Correctness, i64)> = BTreeMap::new();
        for record in &state.records {
            let Some(player) = state.players.iter().find(|p| p.user_id == record.user_id) else {
                continue;
            };
            let Some(choice) = state.choices.iter().find(|c| c.id == record.choice_id) else {
                continue;
            };
            let band = player.age / 10 * 10;
            counts
                .entry((band, choice.correctness.as_str()))
                .or_insert((choice.correctness, 0))
                .1 += 1;
        }
        Ok(counts
            .into_iter()
            .map(|((age_band, _), (correctness, count))| AgeBandStats {
                age_band,
                correctness,
                count,
            })
            .collect())
    }

    async fn attribute_impacts(&self) -> Result<Vec<AttributeImpact>, DomainError> {
        let state = self.state.lock().unwrap();
        let mut totals: BTreeMap<Uuid, i64> = BTreeMap::new();
        for (&(_, attribute_id), &score) in &state.scores {
            *totals.entry(attribute_id).or_insert(0) += score;
        }
        let mut impacts: Vec<AttributeImpact> = state
            .attributes
            .iter()
            .filter_map(|a| {
                totals.get(&a.id).map(|&total| AttributeImpact {
                    attribute_id: a.id,
                    name: a.name.clone(),
                    total,
                })
            })
            .collect();
        impacts.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));
        Ok(impacts)
    }
}

#[async_trait]
impl CatalogRepository for InMemoryGameStore {
    async fn import_catalog(&self, batch: &CatalogBatch) -> Result<(), DomainError> {
        let mut state = self.state.lock().unwrap();
        if let Some(dup) = batch
            .attributes
            .iter()
            .find(|new| state.attributes.iter().any(|a| a.name == new.name))
        {
            return Err(DomainError::Validation(format!(
                "attribute '{}' already exists",
                dup.name
            )));
        }
        state.attributes.extend(batch.attributes.iter().cloned());
        state.levels.extend(batch.levels.iter().cloned());
        state.scenarios.extend(batch.scenarios.iter().cloned());
        state.choices.extend(batch.choices.iter().cloned());
        state.effects.extend(batch.effects.iter().copied());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_uncommitted_transaction_leaves_scores_untouched() {
        // Arrange
        let store = InMemoryGameStore::new();
        let user_id = Uuid::new_v4();
        let attribute_id = Uuid::new_v4();

        // Act
        let mut tx = store.begin().await.unwrap();
        let total = tx.increment_score(user_id, attribute_id, 4).await.unwrap();
        tx.rollback().await.unwrap();

        // Assert
        assert_eq!(total, 4);
        assert_eq!(store.score(user_id, attribute_id), None);
    }

    #[tokio::test]
    async fn test_increment_sees_pending_deltas_of_same_transaction() {
        // Arrange
        let store = InMemoryGameStore::new();
        let user_id = Uuid::new_v4();
        let attribute_id = Uuid::new_v4();

        // Act
        let mut tx = store.begin().await.unwrap();
        tx.increment_score(user_id, attribute_id, 5).await.unwrap();
        let total = tx.increment_score(user_id, attribute_id, -2).await.unwrap();
        tx.commit().await.unwrap();

        // Assert
        assert_eq!(total, 3);
        assert_eq!(store.score(user_id, attribute_id), Some(3));
    }

    #[tokio::test]
    async fn test_fail_on_increment_injects_storage_error() {
        // Arrange
        let store = InMemoryGameStore::new().fail_on_increment(2);
        let user_id = Uuid::new_v4();

        // Act
        let mut tx = store.begin().await.unwrap();
        let first = tx.increment_score(user_id, Uuid::new_v4(), 1).await;
        let second = tx.increment_score(user_id, Uuid::new_v4(), 1).await;

        // Assert
        assert!(first.is_ok());
        assert!(matches!(second, Err(DomainError::Storage(_))));
    }
}
