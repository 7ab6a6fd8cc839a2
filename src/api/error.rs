//! API error handling.
//!
//! This module provides the JSON error body and the mapping from service
//! errors to HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::service::BugError;

// =============================================================================
// API Error
// =============================================================================

/// API error structure for JSON responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ApiError {
    /// Creates a new API error.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// API Error Response
// =============================================================================

/// API error response containing status code and error details.
#[derive(Debug, Clone)]
pub struct ApiErrorResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Error details.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Creates a new API error response.
    #[must_use]
    pub const fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }

    /// Creates a 400 Bad Request response for validation errors.
    #[must_use]
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ApiError::new("VALIDATION_ERROR", message),
        )
    }

    /// Creates a 404 Not Found response.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", message))
    }

    /// Creates a 500 Internal Server Error response.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::new("INTERNAL_ERROR", message),
        )
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<BugError> for ApiErrorResponse {
    fn from(error: BugError) -> Self {
        match error {
            BugError::Validation(payload_error) => Self::validation_error(payload_error.to_string()),
            BugError::NotFound(_) => Self::not_found(error.to_string()),
            // Store details stay in the logs
            BugError::Persistence(cause) => {
                tracing::error!(error = %cause, "Persistence failure");
                Self::internal_error("An internal error occurred")
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BugId, InvalidStatus, PayloadError};
    use crate::infrastructure::RepositoryError;
    use rstest::rstest;

    #[rstest]
    fn test_api_error_new() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        assert_eq!(error.code, "TEST_ERROR");
        assert_eq!(error.message, "Test message");
    }

    #[rstest]
    fn test_validation_error_maps_to_bad_request() {
        let error = BugError::Validation(PayloadError::InvalidStatus(InvalidStatus::new("open")));
        let response = ApiErrorResponse::from(error);

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error.code, "VALIDATION_ERROR");
        assert!(response.error.message.contains("\"open\""));
    }

    #[rstest]
    fn test_not_found_maps_to_404() {
        let response = ApiErrorResponse::from(BugError::NotFound(BugId::new(5)));

        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.error.code, "NOT_FOUND");
        assert_eq!(response.error.message, "Bug 5 not found");
    }

    #[rstest]
    fn test_persistence_error_is_opaque() {
        let error = BugError::Persistence(RepositoryError::DatabaseError(
            "password authentication failed".to_string(),
        ));
        let response = ApiErrorResponse::from(error);

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.error.code, "INTERNAL_ERROR");
        assert!(!response.error.message.contains("password"));
    }
}
