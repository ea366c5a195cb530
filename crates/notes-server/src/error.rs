//! Error types for the server.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Server error type.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed request (e.g. unparsable JSON).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Payload failed field validation.
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Request body over the configured limit.
    #[error("Payload too large")]
    PayloadTooLarge,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Shorthand for the note-not-found response.
    pub fn note_not_found() -> Self {
        Self::NotFound("Note not found".to_string())
    }

    fn status(&self) -> StatusCode {
        match self {
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::BadRequest(_) | ServerError::Validation(_) => StatusCode::BAD_REQUEST,
            ServerError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// HTTP status code, repeated in the body.
    pub status_code: u16,
    /// Always `"error"`.
    pub status: String,
    /// Human-readable error message.
    pub message: String,
    /// Individual validation failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "Server error");
        } else {
            tracing::warn!(status = %status, error = %self, "Client error");
        }

        let (message, errors) = match self {
            ServerError::NotFound(msg) | ServerError::BadRequest(msg) => (msg, None),
            ServerError::Validation(errors) => ("Validation failed".to_string(), Some(errors)),
            ServerError::PayloadTooLarge => ("Payload too large".to_string(), None),
            // Internal details stay in the log
            ServerError::Internal(_) => ("Internal Server Error".to_string(), None),
        };

        let body = ErrorResponse {
            status_code: status.as_u16(),
            status: "error".to_string(),
            message,
            errors,
        };

        (status, Json(body)).into_response()
    }
}
