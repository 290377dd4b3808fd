//! # Error Handling Module
//!
//! Provides structured error types for SipDB operations.
//! Business errors (not-found, conflict, validation) are mapped to HTTP
//! status codes at the API boundary; infrastructure failures propagate.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for SipDB operations
pub type SipResult<T> = Result<T, SipError>;

/// Comprehensive error type for all SipDB operations
#[derive(Error, Debug)]
pub enum SipError {
    /// Database connection or query errors
    #[error("Database error: {0}")]
    Database(String),

    /// JSON parsing or serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Missing or malformed field in a request
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// Request body could not be parsed at all
    #[error("Bad request")]
    BadRequest,

    /// A drink name collided with an existing row
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Referenced drink id does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl SipError {
    /// Shorthand for a field-level validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SipError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            SipError::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
            SipError::Json(_) => StatusCode::BAD_REQUEST,
            SipError::Validation { .. } => StatusCode::BAD_REQUEST,
            SipError::BadRequest => StatusCode::BAD_REQUEST,
            SipError::Conflict(_) => StatusCode::CONFLICT,
            SipError::NotFound(_) => StatusCode::NOT_FOUND,
            SipError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Converts SipError into an Axum HTTP response
impl IntoResponse for SipError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            SipError::Validation { field, message } => Json(json!({
                "error": self.to_string(),
                "field": field,
                "detail": message,
            })),
            _ => Json(json!({ "error": self.to_string() })),
        };

        (status, body).into_response()
    }
}

/// Convert rusqlite errors to SipError
impl From<rusqlite::Error> for SipError {
    fn from(err: rusqlite::Error) -> Self {
        SipError::Database(err.to_string())
    }
}

/// Convert tokio-rusqlite errors to SipError
impl From<tokio_rusqlite::Error> for SipError {
    fn from(err: tokio_rusqlite::Error) -> Self {
        SipError::Database(err.to_string())
    }
}
