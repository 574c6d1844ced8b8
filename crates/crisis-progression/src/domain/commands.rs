//! Commands for the progression context.

use crisis_core::command::Command;
use uuid::Uuid;

/// Command to start a run through a level.
#[derive(Debug, Clone)]
pub struct StartSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The player starting the run.
    pub user_id: Uuid,
    /// The level to play.
    pub level_id: Uuid,
}

impl Command for StartSession {
    fn command_type(&self) -> &'static str {
        "progression.start_session"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
