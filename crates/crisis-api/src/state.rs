//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use crisis_core::clock::Clock;
use crisis_core::policy::ScoreBounds;
use crisis_core::repository::{
    AttributeRepository, CatalogRepository, PlayerRepository, ScenarioRepository,
    ScoringRepository, StatisticsRepository,
};
use crisis_progression::media::MediaProvider;

use crate::sessions::{DEFAULT_IDLE_TIMEOUT, SessionRegistry};

/// Gameplay knobs read from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSettings {
    /// Bounds applied to reported attribute scores.
    pub bounds: ScoreBounds,
    /// Fewest choices a scenario may offer when a level is loaded.
    pub min_choices: usize,
    /// How long an untouched session is kept before it is dropped.
    pub session_idle_timeout: Duration,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            bounds: ScoreBounds::unbounded(),
            min_choices: 2,
            session_idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Clock for timestamps.
    pub clock: Arc<dyn Clock>,
    /// Levels, scenarios and choices.
    pub scenarios: Arc<dyn ScenarioRepository>,
    /// Attribute catalog.
    pub attributes: Arc<dyn AttributeRepository>,
    /// Registered players.
    pub players: Arc<dyn PlayerRepository>,
    /// Choice effects and player scores.
    pub scoring: Arc<dyn ScoringRepository>,
    /// Dashboard aggregates.
    pub statistics: Arc<dyn StatisticsRepository>,
    /// Bulk catalog writes.
    pub catalog: Arc<dyn CatalogRepository>,
    /// Media lookup for scenario views.
    pub media: Arc<dyn MediaProvider>,
    /// Running player sessions.
    pub sessions: SessionRegistry,
    /// Gameplay settings.
    pub settings: GameSettings,
}

impl AppState {
    /// Create application state with every repository served by `store`.
    #[must_use]
    pub fn from_store<S>(
        store: S,
        clock: Arc<dyn Clock>,
        media: Arc<dyn MediaProvider>,
        settings: GameSettings,
    ) -> Self
    where
        S: ScenarioRepository
            + AttributeRepository
            + PlayerRepository
            + ScoringRepository
            + StatisticsRepository
            + CatalogRepository
            + 'static,
    {
        let store = Arc::new(store);
        Self {
            clock,
            scenarios: store.clone(),
            attributes: store.clone(),
            players: store.clone(),
            scoring: store.clone(),
            statistics: store.clone(),
            catalog: store,
            media,
            sessions: SessionRegistry::with_idle_timeout(settings.session_idle_timeout),
            settings,
        }
    }
}
