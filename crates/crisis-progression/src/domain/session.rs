//! The player session state machine.
//!
//! A session is `InProgress` while `current_index < len` and `Finished`
//! afterwards. The only transition is [`PlayerSession::advance`]; finished is
//! terminal. Each scenario takes one answer: [`PlayerSession::answer`] marks
//! the current scenario answered until the next advance. A session is owned
//! by exactly one caller and is not shared across threads.

use crisis_core::error::DomainError;
use crisis_core::model::{Choice, Correctness, Scenario};
use serde::Serialize;
use uuid::Uuid;

/// A scenario together with the choices it offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioStep {
    /// The scenario shown.
    pub scenario: Scenario,
    /// The options offered.
    pub choices: Vec<Choice>,
}

/// The adjudication of one submitted choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceOutcome {
    /// The scenario the choice answered.
    pub scenario_id: Uuid,
    /// The submitted choice.
    pub choice_id: Uuid,
    /// `true` iff the choice is marked good.
    pub is_correct: bool,
    /// The choice's outcome text.
    pub feedback_text: String,
}

/// One player's walk through an ordered scenario sequence.
#[derive(Debug, Clone)]
pub struct PlayerSession {
    id: Uuid,
    user_id: Uuid,
    level_id: Uuid,
    steps: Vec<ScenarioStep>,
    current_index: usize,
    answered: bool,
    finished: bool,
}

impl PlayerSession {
    /// Starts a session at the first step.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::EmptySequence` if `steps` is empty.
    pub fn start(
        user_id: Uuid,
        level_id: Uuid,
        steps: Vec<ScenarioStep>,
    ) -> Result<Self, DomainError> {
        if steps.is_empty() {
            return Err(DomainError::EmptySequence);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            level_id,
            steps,
            current_index: 0,
            answered: false,
            finished: false,
        })
    }

    /// Session identifier.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The player walking this session.
    #[must_use]
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// The level being played.
    #[must_use]
    pub fn level_id(&self) -> Uuid {
        self.level_id
    }

    /// Zero-based position in the sequence; equals `len()` once finished.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Number of scenarios in the sequence.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always `false`: a session cannot be started empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Whether every scenario has been passed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Whether the current scenario already has an answer.
    #[must_use]
    pub fn is_answered(&self) -> bool {
        self.answered
    }

    /// The step at the current index.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionFinished` once the session is finished.
    pub fn current(&self) -> Result<&ScenarioStep, DomainError> {
        if self.finished {
            return Err(DomainError::SessionFinished);
        }
        self.steps
            .get(self.current_index)
            .ok_or(DomainError::SessionFinished)
    }

    /// Adjudicates `choice_id` against the current scenario without moving
    /// the session.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionFinished` once the session is finished and
    /// `DomainError::InvalidChoice` if the choice is not offered by the
    /// current scenario.
    pub fn submit_choice(&self, choice_id: Uuid) -> Result<ChoiceOutcome, DomainError> {
        let step = self.current()?;
        let choice = step
            .choices
            .iter()
            .find(|c| c.id == choice_id)
            .ok_or(DomainError::InvalidChoice {
                choice_id,
                scenario_id: step.scenario.id,
            })?;

        Ok(ChoiceOutcome {
            scenario_id: step.scenario.id,
            choice_id,
            is_correct: choice.correctness == Correctness::Good,
            feedback_text: choice.outcome_text.clone(),
        })
    }

    /// Adjudicates `choice_id` like [`Self::submit_choice`] and marks the
    /// current scenario answered.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AlreadyAnswered` if the current scenario was
    /// answered since the last advance, otherwise the errors of
    /// [`Self::submit_choice`]. A rejected choice leaves the scenario open.
    pub fn answer(&mut self, choice_id: Uuid) -> Result<ChoiceOutcome, DomainError> {
        let scenario_id = self.current()?.scenario.id;
        if self.answered {
            return Err(DomainError::AlreadyAnswered { scenario_id });
        }
        let outcome = self.submit_choice(choice_id)?;
        self.answered = true;
        Ok(outcome)
    }

    /// Reopens the current scenario after its answer could not be recorded.
    pub fn withdraw_answer(&mut self) {
        self.answered = false;
    }

    /// Moves to the next scenario. A no-op once finished.
    pub fn advance(&mut self) {
        if self.finished {
            return;
        }
        self.answered = false;
        self.current_index += 1;
        if self.current_index >= self.steps.len() {
            self.finished = true;
        }
    }
}
