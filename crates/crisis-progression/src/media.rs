//! Scenario media lookup.
//!
//! Media are opaque URIs keyed by scenario identity; nothing here inspects
//! or fetches them.

use serde::Serialize;
use uuid::Uuid;

/// Video URIs for one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioMedia {
    /// Clip played when the scenario is shown.
    pub intro: String,
    /// Clip played after a correct choice.
    pub correct_outcome: String,
    /// Clip played after an incorrect choice.
    pub wrong_outcome: String,
}

/// Supplies media for scenarios.
pub trait MediaProvider: Send + Sync {
    /// Media for `scenario_id`, or `None` if the scenario has no media.
    fn scenario_media(&self, scenario_id: Uuid) -> Option<ScenarioMedia>;
}

/// Derives media URIs from a fixed base path.
#[derive(Debug, Clone)]
pub struct StaticMediaProvider {
    base_url: String,
}

impl StaticMediaProvider {
    /// Creates a provider rooted at `base_url`. A trailing slash is ignored.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }
}

impl MediaProvider for StaticMediaProvider {
    fn scenario_media(&self, scenario_id: Uuid) -> Option<ScenarioMedia> {
        let stem = format!("{}/scenario_{scenario_id}", self.base_url);
        Some(ScenarioMedia {
            intro: format!("{stem}.mp4"),
            correct_outcome: format!("{stem}_correct.mp4"),
            wrong_outcome: format!("{stem}_wrong.mp4"),
        })
    }
}

/// A provider for deployments without media.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMedia;

impl MediaProvider for NoMedia {
    fn scenario_media(&self, _scenario_id: Uuid) -> Option<ScenarioMedia> {
        None
    }
}
