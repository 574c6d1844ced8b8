//! Commands for the content context.

use crisis_core::command::Command;
use uuid::Uuid;

/// Command to import a scenario pack from its YAML source.
#[derive(Debug, Clone)]
pub struct ImportScenarioPack {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The pack document.
    pub source: String,
}

impl Command for ImportScenarioPack {
    fn command_type(&self) -> &'static str {
        "content.import_scenario_pack"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
