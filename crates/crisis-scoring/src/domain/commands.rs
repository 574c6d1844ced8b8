//! Commands for the scoring context.

use crisis_core::command::Command;
use uuid::Uuid;

/// Command to log a submitted choice and apply its effects.
#[derive(Debug, Clone)]
pub struct RecordChoice {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The player who chose.
    pub user_id: Uuid,
    /// The level being played.
    pub level_id: Uuid,
    /// The scenario answered.
    pub scenario_id: Uuid,
    /// The option picked.
    pub choice_id: Uuid,
}

impl Command for RecordChoice {
    fn command_type(&self) -> &'static str {
        "scoring.record_choice"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to apply a choice's effects to a player without logging it.
#[derive(Debug, Clone)]
pub struct ApplyChoiceEffects {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The player whose scores change.
    pub user_id: Uuid,
    /// The choice whose effects apply.
    pub choice_id: Uuid,
}

impl Command for ApplyChoiceEffects {
    fn command_type(&self) -> &'static str {
        "scoring.apply_choice_effects"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to create or overwrite a choice → attribute effect.
#[derive(Debug, Clone)]
pub struct LinkChoiceToAttribute {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The choice carrying the effect.
    pub choice_id: Uuid,
    /// The affected attribute.
    pub attribute_id: Uuid,
    /// Signed score contribution.
    pub delta: i64,
}

impl Command for LinkChoiceToAttribute {
    fn command_type(&self) -> &'static str {
        "scoring.link_choice_to_attribute"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to register a new player.
#[derive(Debug, Clone)]
pub struct RegisterPlayer {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Given name.
    pub firstname: String,
    /// Family name.
    pub lastname: String,
    /// Age in years.
    pub age: i32,
    /// Self-reported crisis readiness.
    pub crisis_ready: Option<bool>,
}

impl Command for RegisterPlayer {
    fn command_type(&self) -> &'static str {
        "scoring.register_player"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
