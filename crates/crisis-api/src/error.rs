//! API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use crisis_core::error::DomainError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Failures that stop the server from starting or serving.
#[derive(Debug, Error)]
pub enum AppError {
    /// An environment variable is missing or does not parse.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database connection, pool or migration error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Binding the listener or reading the seed pack failed.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),

    /// Tracing or span export could not be set up.
    #[error("telemetry error: {0}")]
    Telemetry(String),
}

/// Body of every non-2xx JSON response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Stable snake_case code clients branch on.
    pub error: &'static str,
    /// The domain error's display text.
    pub message: String,
}

/// Lets handlers return `DomainError` with `?`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            DomainError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            DomainError::InvalidChoice { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "invalid_choice")
            }
            DomainError::AlreadyAnswered { .. } => (StatusCode::CONFLICT, "already_answered"),
            DomainError::SessionFinished => (StatusCode::CONFLICT, "session_finished"),
            DomainError::EmptySequence => (StatusCode::UNPROCESSABLE_ENTITY, "empty_sequence"),
            DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            DomainError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
        };

        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }

        let body = ErrorBody {
            error: error_code,
            message: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
