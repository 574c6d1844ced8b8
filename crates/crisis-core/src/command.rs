//! Requests that change game state.

use uuid::Uuid;

/// A state-changing request handled by one of the engines.
///
/// Handlers record `command_type` on their span and log the correlation id
/// on success, so one request can be followed across crates.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// Dotted name such as `scoring.record_choice`.
    fn command_type(&self) -> &'static str;

    /// Id shared by every log line this request produces.
    fn correlation_id(&self) -> Uuid;
}
