//! Scenario pack documents.
//!
//! ```yaml
//! attributes:
//!   - name: lojal
//!     description: Puts the group before themselves.
//! levels:
//!   - number: 1
//!     title: The first day
//!     scenarios:
//!       - prompt: The sirens sound.
//!         choices:
//!           - option: Stay inside.
//!             outcome: You stay safe.
//!             correctness: good
//!             effects:
//!               lojal: 2
//! ```
//!
//! Scenarios are played in the order they are listed; choices are offered
//! in the order they are listed.

use std::collections::{BTreeMap, HashSet};

use crisis_core::error::DomainError;
use crisis_core::model::Correctness;
use serde::Deserialize;

/// A parsed scenario pack.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioPack {
    /// Attributes introduced by the pack.
    #[serde(default)]
    pub attributes: Vec<PackAttribute>,
    /// Levels in the pack.
    pub levels: Vec<PackLevel>,
}

/// An attribute definition.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackAttribute {
    /// Unique attribute name.
    pub name: String,
    /// Explanation shown in summaries.
    #[serde(default)]
    pub description: String,
}

/// A level with its scenarios in play order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackLevel {
    /// Level number, unique across the catalog.
    pub number: i32,
    /// Level title.
    pub title: String,
    /// Scenarios in play order.
    pub scenarios: Vec<PackScenario>,
}

/// One scenario of a pack level, in play order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackScenario {
    /// Narrative text shown to the player.
    pub prompt: String,
    /// Options in display order.
    pub choices: Vec<PackChoice>,
}

/// One option of a pack scenario.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackChoice {
    /// Text on the option.
    pub option: String,
    /// Feedback shown once picked; empty if omitted.
    #[serde(default)]
    pub outcome: String,
    /// Judgement of the option.
    pub correctness: Correctness,
    /// Attribute name to score delta.
    #[serde(default)]
    pub effects: BTreeMap<String, i64>,
}

impl ScenarioPack {
    /// Every attribute name referenced by a choice effect.
    pub fn referenced_attributes(&self) -> impl Iterator<Item = &str> {
        self.levels
            .iter()
            .flat_map(|l| &l.scenarios)
            .flat_map(|s| &s.choices)
            .flat_map(|c| c.effects.keys())
            .map(String::as_str)
    }
}

fn invalid(message: impl Into<String>) -> DomainError {
    DomainError::Validation(message.into())
}

/// Parses and structurally validates a pack.
///
/// Effects may name attributes the pack does not define; those must already
/// exist in the catalog and are resolved at import time.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the document is not a valid pack,
/// defines no level, repeats an attribute name or level number, has a blank
/// title or prompt or option, or contains a scenario without choices.
pub fn parse_pack(source: &str) -> Result<ScenarioPack, DomainError> {
    let pack: ScenarioPack = serde_yaml::from_str(source)
        .map_err(|e| invalid(format!("malformed scenario pack: {e}")))?;

    if pack.levels.is_empty() {
        return Err(invalid("scenario pack defines no levels"));
    }

    let mut names = HashSet::new();
    for attribute in &pack.attributes {
        if attribute.name.trim().is_empty() {
            return Err(invalid("attribute name must not be empty"));
        }
        if !names.insert(attribute.name.as_str()) {
            return Err(invalid(format!(
                "attribute '{}' is defined twice",
                attribute.name
            )));
        }
    }

    let mut numbers = HashSet::new();
    for level in &pack.levels {
        if !numbers.insert(level.number) {
            return Err(invalid(format!("level {} is defined twice", level.number)));
        }
        if level.title.trim().is_empty() {
            return Err(invalid(format!("level {} has no title", level.number)));
        }
        for (index, scenario) in level.scenarios.iter().enumerate() {
            let position = index + 1;
            if scenario.prompt.trim().is_empty() {
                return Err(invalid(format!(
                    "level {} scenario {position} has no prompt",
                    level.number
                )));
            }
            if scenario.choices.is_empty() {
                return Err(invalid(format!(
                    "level {} scenario {position} has no choices",
                    level.number
                )));
            }
            if scenario.choices.iter().any(|c| c.option.trim().is_empty()) {
                return Err(invalid(format!(
                    "level {} scenario {position} has a blank option",
                    level.number
                )));
            }
        }
    }

    Ok(pack)
}
