//! CineReview API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cinereview_core::error::DomainError;
use serde::Serialize;
use thiserror::Error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database connection or pool error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The tracing pipeline could not be installed.
    #[error("telemetry error: {0}")]
    Telemetry(String),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),

    /// An account operation failed outside a request.
    #[error("account error: {0}")]
    Account(#[from] DomainError),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorBody {
    pub(crate) fn response(status: StatusCode, error: &'static str, message: impl Into<String>) -> Response {
        (
            status,
            Json(Self {
                error,
                message: message.into(),
            }),
        )
            .into_response()
    }
}

/// HTTP-layer wrapper around `DomainError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            DomainError::MovieNotFound(_) => (StatusCode::NOT_FOUND, "movie_not_found"),
            DomainError::ReviewNotFound(_) => (StatusCode::NOT_FOUND, "review_not_found"),
            DomainError::GenreNotFound(_) => (StatusCode::NOT_FOUND, "genre_not_found"),
            DomainError::UserNotFound(_) => (StatusCode::NOT_FOUND, "user_not_found"),
            DomainError::ReviewAlreadyExists { .. } => {
                (StatusCode::CONFLICT, "review_already_exists")
            }
            DomainError::GenreAlreadyExists(_) => (StatusCode::CONFLICT, "genre_already_exists"),
            DomainError::UserAlreadyExists(_) => (StatusCode::CONFLICT, "user_already_exists"),
            DomainError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            DomainError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
            DomainError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            DomainError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();

        // Driver messages stay in the logs.
        let message = if let DomainError::Infrastructure(detail) = &self.0 {
            tracing::error!(error = %detail, "request failed on infrastructure error");
            "internal server error".to_owned()
        } else {
            self.0.to_string()
        };

        ErrorBody::response(status, error_code, message)
    }
}
