//! Domain entities shared by every bounded context.
//!
//! Catalog entities (levels, scenarios, choices, attributes, effects) are
//! immutable once created. Player scores are running totals and choice
//! records are an append-only log.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// How a choice is judged when a player picks it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Correctness {
    /// The recommended action.
    Good,
    /// The discouraged action.
    Bad,
    /// Neither recommended nor discouraged.
    Neutral,
}

impl Correctness {
    /// Stable lowercase name, as stored in the database.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Bad => "bad",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Correctness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Correctness {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "good" => Ok(Self::Good),
            "bad" => Ok(Self::Bad),
            "neutral" => Ok(Self::Neutral),
            other => Err(DomainError::Validation(format!(
                "unknown correctness '{other}'"
            ))),
        }
    }
}

/// A named, ordered group of scenarios.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    /// Level identifier.
    pub id: Uuid,
    /// Display order among levels.
    pub level_number: i32,
    /// Human-readable title.
    pub title: String,
}

/// A single decision point shown to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario identifier.
    pub id: Uuid,
    /// The level this scenario belongs to.
    pub level_id: Uuid,
    /// Position within the level's sequence.
    pub ordinal_position: i32,
    /// Narrative text shown to the player.
    pub prompt_text: String,
}

/// One selectable option within a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Choice identifier.
    pub id: Uuid,
    /// The scenario offering this choice.
    pub scenario_id: Uuid,
    /// Text shown on the option.
    pub option_text: String,
    /// Feedback shown after the option is picked.
    pub outcome_text: String,
    /// How the choice is judged.
    pub correctness: Correctness,
}

/// A personality/behavior dimension that accumulates a score per player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute identifier.
    pub id: Uuid,
    /// Unique name.
    pub name: String,
    /// Explanation shown in summaries.
    pub description: String,
}

/// Catalog edge: picking `choice_id` moves `attribute_id` by `delta`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceAttributeEffect {
    /// The choice carrying the effect.
    pub choice_id: Uuid,
    /// The affected attribute.
    pub attribute_id: Uuid,
    /// Signed score contribution.
    pub delta: i64,
}

/// A single effect of a choice, without the choice key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeEffect {
    /// The affected attribute.
    pub attribute_id: Uuid,
    /// Signed score contribution.
    pub delta: i64,
}

/// Running total for one player on one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerAttributeScore {
    /// The player.
    pub user_id: Uuid,
    /// The attribute.
    pub attribute_id: Uuid,
    /// Raw sum of every applied delta.
    pub score: i64,
}

/// Append-only audit entry for one submitted choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerChoiceRecord {
    /// Record identifier.
    pub id: Uuid,
    /// The player who chose.
    pub user_id: Uuid,
    /// The level being played.
    pub level_id: Uuid,
    /// The scenario answered.
    pub scenario_id: Uuid,
    /// The option picked.
    pub choice_id: Uuid,
    /// When the choice was recorded.
    pub chosen_at: DateTime<Utc>,
}

/// A registered player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Player identifier.
    pub user_id: Uuid,
    /// Given name.
    pub firstname: String,
    /// Family name.
    pub lastname: String,
    /// Age in years.
    pub age: i32,
    /// Self-reported readiness for a crisis, if answered.
    pub crisis_ready: Option<bool>,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// An attribute with a player's score on it, as reported in summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeTotal {
    /// The attribute.
    pub attribute_id: Uuid,
    /// Attribute name.
    pub name: String,
    /// Attribute description.
    pub description: String,
    /// Score after the configured bounds are applied.
    pub score: i64,
}

/// Submitted-choice counts for one scenario, split by correctness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScenarioChoiceStats {
    /// The scenario.
    pub scenario_id: Uuid,
    /// Choices judged good.
    pub good: i64,
    /// Choices judged bad.
    pub bad: i64,
    /// Choices judged neutral.
    pub neutral: i64,
}

/// Submitted-choice count for one ten-year age band and correctness class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgeBandStats {
    /// Lower bound of the band (e.g. 20 for ages 20–29).
    pub age_band: i32,
    /// Correctness class of the counted choices.
    pub correctness: Correctness,
    /// Number of submitted choices.
    pub count: i64,
}

/// Sum of stored scores on one attribute across all players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeImpact {
    /// The attribute.
    pub attribute_id: Uuid,
    /// Attribute name.
    pub name: String,
    /// Total score across players.
    pub total: i64,
}

/// A batch of new catalog rows written in one transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogBatch {
    /// Attributes not yet in the catalog.
    pub attributes: Vec<Attribute>,
    /// New levels.
    pub levels: Vec<Level>,
    /// New scenarios.
    pub scenarios: Vec<Scenario>,
    /// New choices.
    pub choices: Vec<Choice>,
    /// Effects linking the new choices to attributes.
    pub effects: Vec<ChoiceAttributeEffect>,
}
