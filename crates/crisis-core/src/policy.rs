//! Score bounds applied when attribute totals are reported.

use serde::Serialize;

use crate::error::DomainError;

/// Optional floor and ceiling on reported attribute scores.
///
/// Stored totals are always the raw sum of applied deltas; bounds only shape
/// what callers see, so the reported value is `clamp(sum)` regardless of the
/// order deltas arrived in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreBounds {
    floor: Option<i64>,
    ceiling: Option<i64>,
}

impl ScoreBounds {
    /// Builds bounds, rejecting a floor above the ceiling.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `floor > ceiling`.
    pub fn new(floor: Option<i64>, ceiling: Option<i64>) -> Result<Self, DomainError> {
        if let (Some(lo), Some(hi)) = (floor, ceiling) {
            if lo > hi {
                return Err(DomainError::Validation(format!(
                    "score floor {lo} is above score ceiling {hi}"
                )));
            }
        }
        Ok(Self { floor, ceiling })
    }

    /// No floor, no ceiling.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Scores never reported below `floor`.
    #[must_use]
    pub fn floored_at(floor: i64) -> Self {
        Self {
            floor: Some(floor),
            ceiling: None,
        }
    }

    /// The configured floor, if any.
    #[must_use]
    pub fn floor(&self) -> Option<i64> {
        self.floor
    }

    /// The configured ceiling, if any.
    #[must_use]
    pub fn ceiling(&self) -> Option<i64> {
        self.ceiling
    }

    /// Applies the bounds to a raw total.
    #[must_use]
    pub fn apply(&self, raw: i64) -> i64 {
        let floored = self.floor.map_or(raw, |lo| raw.max(lo));
        self.ceiling.map_or(floored, |hi| floored.min(hi))
    }
}
