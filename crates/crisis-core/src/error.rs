//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A referenced entity (player, level, scenario, choice, attribute,
    /// session) does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of entity that was looked up.
        entity: &'static str,
        /// The identifier that did not resolve.
        id: Uuid,
    },

    /// A submitted choice does not belong to the scenario currently shown.
    #[error("choice {choice_id} does not belong to scenario {scenario_id}")]
    InvalidChoice {
        /// The submitted choice.
        choice_id: Uuid,
        /// The scenario the session is currently on.
        scenario_id: Uuid,
    },

    /// The current scenario already has an answer; advance before answering
    /// again.
    #[error("scenario {scenario_id} has already been answered")]
    AlreadyAnswered {
        /// The scenario the session is currently on.
        scenario_id: Uuid,
    },

    /// An operation needing an active scenario was called on a finished session.
    #[error("session is finished")]
    SessionFinished,

    /// A session was started with no scenarios.
    #[error("cannot start a session with an empty scenario sequence")]
    EmptySequence,

    /// Input failed domain validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// The persistence layer failed.
    #[error("storage error: {0}")]
    Storage(String),
}

impl DomainError {
    /// Shorthand for a [`DomainError::NotFound`].
    #[must_use]
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }
}
