//! `PostgreSQL` implementation of the repository traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

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

use crate::schema;

/// PostgreSQL-backed game store.
#[derive(Debug, Clone)]
pub struct PgGameStore {
    pool: PgPool,
}

impl PgGameStore {
    /// Creates a new `PgGameStore`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[allow(clippy::needless_pass_by_value)]
fn storage(err: sqlx::Error) -> DomainError {
    DomainError::Storage(err.to_string())
}

/// Maps unique-key violations on catalog writes to `Validation`.
fn write_error(err: sqlx::Error) -> DomainError {
    match err {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            DomainError::Validation(format!("duplicate catalog entry: {}", db.message()))
        }
        other => storage(other),
    }
}

fn parse_correctness(raw: &str) -> Result<Correctness, DomainError> {
    raw.parse()
        .map_err(|_| DomainError::Storage(format!("unexpected correctness '{raw}' in choices")))
}

#[derive(FromRow)]
struct LevelRow {
    id: Uuid,
    level_number: i32,
    title: String,
}

impl From<LevelRow> for Level {
    fn from(row: LevelRow) -> Self {
        Self {
            id: row.id,
            level_number: row.level_number,
            title: row.title,
        }
    }
}

#[derive(FromRow)]
struct ScenarioRow {
    id: Uuid,
    level_id: Uuid,
    ordinal_position: i32,
    prompt_text: String,
}

impl From<ScenarioRow> for Scenario {
    fn from(row: ScenarioRow) -> Self {
        Self {
            id: row.id,
            level_id: row.level_id,
            ordinal_position: row.ordinal_position,
            prompt_text: row.prompt_text,
        }
    }
}

#[derive(FromRow)]
struct ChoiceRow {
    id: Uuid,
    scenario_id: Uuid,
    option_text: String,
    outcome_text: String,
    correctness: String,
}

impl TryFrom<ChoiceRow> for Choice {
    type Error = DomainError;

    fn try_from(row: ChoiceRow) -> Result<Self, Self::Error> {
        Ok(Self {
            correctness: parse_correctness(&row.correctness)?,
            id: row.id,
            scenario_id: row.scenario_id,
            option_text: row.option_text,
            outcome_text: row.outcome_text,
        })
    }
}

#[derive(FromRow)]
struct AttributeRow {
    id: Uuid,
    name: String,
    description: String,
}

impl From<AttributeRow> for Attribute {
    fn from(row: AttributeRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
        }
    }
}

#[derive(FromRow)]
struct PlayerRow {
    user_id: Uuid,
    firstname: String,
    lastname: String,
    age: i32,
    crisis_ready: Option<bool>,
    created_at: DateTime<Utc>,
}

impl From<PlayerRow> for Player {
    fn from(row: PlayerRow) -> Self {
        Self {
            user_id: row.user_id,
            firstname: row.firstname,
            lastname: row.lastname,
            age: row.age,
            crisis_ready: row.crisis_ready,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl ScenarioRepository for PgGameStore {
    async fn get_level(&self, level_id: Uuid) -> Result<Level, DomainError> {
        sqlx::query_as::<_, LevelRow>(schema::SELECT_LEVEL)
            .bind(level_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?
            .map(Level::from)
            .ok_or_else(|| DomainError::not_found("level", level_id))
    }

    async fn list_levels(&self) -> Result<Vec<Level>, DomainError> {
        let rows = sqlx::query_as::<_, LevelRow>(schema::SELECT_LEVELS)
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;
        Ok(rows.into_iter().map(Level::from).collect())
    }

    async fn list_level_scenarios(&self, level_id: Uuid) -> Result<Vec<Scenario>, DomainError> {
        let rows = sqlx::query_as::<_, ScenarioRow>(schema::SELECT_LEVEL_SCENARIOS)
            .bind(level_id)
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;
        debug!(%level_id, scenarios = rows.len(), "loaded level scenarios");
        Ok(rows.into_iter().map(Scenario::from).collect())
    }

    async fn get_scenario(&self, scenario_id: Uuid) -> Result<Scenario, DomainError> {
        sqlx::query_as::<_, ScenarioRow>(schema::SELECT_SCENARIO)
            .bind(scenario_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?
            .map(Scenario::from)
            .ok_or_else(|| DomainError::not_found("scenario", scenario_id))
    }

    async fn get_choices_for_scenario(
        &self,
        scenario_id: Uuid,
    ) -> Result<Vec<Choice>, DomainError> {
        sqlx::query_as::<_, ChoiceRow>(schema::SELECT_SCENARIO_CHOICES)
            .bind(scenario_id)
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?
            .into_iter()
            .map(Choice::try_from)
            .collect()
    }

    async fn get_choice(&self, choice_id: Uuid) -> Result<Choice, DomainError> {
        sqlx::query_as::<_, ChoiceRow>(schema::SELECT_CHOICE)
            .bind(choice_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?
            .ok_or_else(|| DomainError::not_found("choice", choice_id))?
            .try_into()
    }
}

#[async_trait]
impl AttributeRepository for PgGameStore {
    async fn get_attribute(&self, attribute_id: Uuid) -> Result<Attribute, DomainError> {
        sqlx::query_as::<_, AttributeRow>(schema::SELECT_ATTRIBUTE)
            .bind(attribute_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?
            .map(Attribute::from)
            .ok_or_else(|| DomainError::not_found("attribute", attribute_id))
    }

    async fn list_attributes(&self) -> Result<Vec<Attribute>, DomainError> {
        let rows = sqlx::query_as::<_, AttributeRow>(schema::SELECT_ATTRIBUTES)
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;
        Ok(rows.into_iter().map(Attribute::from).collect())
    }
}

#[async_trait]
impl PlayerRepository for PgGameStore {
    async fn insert_player(&self, player: &Player) -> Result<(), DomainError> {
        sqlx::query(schema::INSERT_PLAYER)
            .bind(player.user_id)
            .bind(&player.firstname)
            .bind(&player.lastname)
            .bind(player.age)
            .bind(player.crisis_ready)
            .bind(player.created_at)
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        Ok(())
    }

    async fn get_player(&self, user_id: Uuid) -> Result<Player, DomainError> {
        sqlx::query_as::<_, PlayerRow>(schema::SELECT_PLAYER)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?
            .map(Player::from)
            .ok_or_else(|| DomainError::not_found("player", user_id))
    }
}

#[async_trait]
impl ScoringRepository for PgGameStore {
    async fn effects_for_choice(
        &self,
        choice_id: Uuid,
    ) -> Result<Vec<AttributeEffect>, DomainError> {
        let rows = sqlx::query_as::<_, (Uuid, i64)>(schema::SELECT_CHOICE_EFFECTS)
            .bind(choice_id)
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;
        Ok(rows
            .into_iter()
            .map(|(attribute_id, delta)| AttributeEffect {
                attribute_id,
                delta,
            })
            .collect())
    }

    async fn upsert_choice_effect(
        &self,
        effect: &ChoiceAttributeEffect,
    ) -> Result<(), DomainError> {
        sqlx::query(schema::UPSERT_CHOICE_EFFECT)
            .bind(effect.choice_id)
            .bind(effect.attribute_id)
            .bind(effect.delta)
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        Ok(())
    }

    async fn scores_for_player(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<PlayerAttributeScore>, DomainError> {
        let rows = sqlx::query_as::<_, (Uuid, Uuid, i64)>(schema::SELECT_PLAYER_SCORES)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;
        Ok(rows
            .into_iter()
            .map(|(user_id, attribute_id, score)| PlayerAttributeScore {
                user_id,
                attribute_id,
                score,
            })
            .collect())
    }

    async fn begin(&self) -> Result<Box<dyn ScoringTransaction>, DomainError> {
        let tx = self.pool.begin().await.map_err(storage)?;
        Ok(Box::new(PgScoringTransaction { tx }))
    }
}

/// A scoring unit of work backed by a database transaction.
///
/// Dropping it without calling `commit` rolls the transaction back.
pub struct PgScoringTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl ScoringTransaction for PgScoringTransaction {
    async fn append_choice_record(
        &mut self,
        record: &PlayerChoiceRecord,
    ) -> Result<(), DomainError> {
        sqlx::query(schema::INSERT_CHOICE_RECORD)
            .bind(record.id)
            .bind(record.user_id)
            .bind(record.level_id)
            .bind(record.scenario_id)
            .bind(record.choice_id)
            .bind(record.chosen_at)
            .execute(&mut *self.tx)
            .await
            .map_err(storage)?;
        Ok(())
    }

    async fn increment_score(
        &mut self,
        user_id: Uuid,
        attribute_id: Uuid,
        delta: i64,
    ) -> Result<i64, DomainError> {
        sqlx::query_scalar::<_, i64>(schema::INCREMENT_SCORE)
            .bind(user_id)
            .bind(attribute_id)
            .bind(delta)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(storage)
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        self.tx.commit().await.map_err(storage)
    }

    async fn rollback(self: Box<Self>) -> Result<(), DomainError> {
        self.tx.rollback().await.map_err(storage)
    }
}

#[async_trait]
impl StatisticsRepository for PgGameStore {
    async fn choice_overview(&self) -> Result<Vec<ScenarioChoiceStats>, DomainError> {
        let rows = sqlx::query_as::<_, (Uuid, i64, i64, i64)>(schema::SELECT_CHOICE_OVERVIEW)
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;
        Ok(rows
            .into_iter()
            .map(|(scenario_id, good, bad, neutral)| ScenarioChoiceStats {
                scenario_id,
                good,
                bad,
                neutral,
            })
            .collect())
    }

    async fn age_behavior(&self) -> Result<Vec<AgeBandStats>, DomainError> {
        let rows = sqlx::query_as::<_, (i32, String, i64)>(schema::SELECT_AGE_BEHAVIOR)
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;
        rows.into_iter()
            .map(|(age_band, correctness, count)| {
                Ok(AgeBandStats {
                    age_band,
                    correctness: parse_correctness(&correctness)?,
                    count,
                })
            })
            .collect()
    }

    async fn attribute_impacts(&self) -> Result<Vec<AttributeImpact>, DomainError> {
        let rows = sqlx::query_as::<_, (Uuid, String, i64)>(schema::SELECT_ATTRIBUTE_IMPACTS)
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;
        Ok(rows
            .into_iter()
            .map(|(attribute_id, name, total)| AttributeImpact {
                attribute_id,
                name,
                total,
            })
            .collect())
    }
}

#[async_trait]
impl CatalogRepository for PgGameStore {
    async fn import_catalog(&self, batch: &CatalogBatch) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(storage)?;

        for attribute in &batch.attributes {
            sqlx::query(schema::INSERT_ATTRIBUTE)
                .bind(attribute.id)
                .bind(&attribute.name)
                .bind(&attribute.description)
                .execute(&mut *tx)
                .await
                .map_err(write_error)?;
        }
        for level in &batch.levels {
            sqlx::query(schema::INSERT_LEVEL)
                .bind(level.id)
                .bind(level.level_number)
                .bind(&level.title)
                .execute(&mut *tx)
                .await
                .map_err(write_error)?;
        }
        for scenario in &batch.scenarios {
            sqlx::query(schema::INSERT_SCENARIO)
                .bind(scenario.id)
                .bind(scenario.level_id)
                .bind(scenario.ordinal_position)
                .bind(&scenario.prompt_text)
                .execute(&mut *tx)
                .await
                .map_err(write_error)?;
        }
        for choice in &batch.choices {
            sqlx::query(schema::INSERT_CHOICE)
                .bind(choice.id)
                .bind(choice.scenario_id)
                .bind(&choice.option_text)
                .bind(&choice.outcome_text)
                .bind(choice.correctness.as_str())
                .execute(&mut *tx)
                .await
                .map_err(write_error)?;
        }
        for effect in &batch.effects {
            sqlx::query(schema::UPSERT_CHOICE_EFFECT)
                .bind(effect.choice_id)
                .bind(effect.attribute_id)
                .bind(effect.delta)
                .execute(&mut *tx)
                .await
                .map_err(write_error)?;
        }

        tx.commit().await.map_err(storage)?;
        debug!(
            levels = batch.levels.len(),
            scenarios = batch.scenarios.len(),
            choices = batch.choices.len(),
            "catalog batch written"
        );
        Ok(())
    }
}
