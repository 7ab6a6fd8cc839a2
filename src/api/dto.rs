//! Data Transfer Objects for API requests and responses.
//!
//! Request bodies are not deserialized into fixed structs: they are decoded
//! into an optional JSON value and handed to the service, which owns the
//! payload rules.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ApiErrorResponse;
use crate::domain::Bug;

// =============================================================================
// Bug DTOs
// =============================================================================

/// Wire representation of a bug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BugResponse {
    /// Bug ID.
    pub id: i64,
    /// Short summary.
    pub title: String,
    /// Full description.
    pub description: String,
    /// Free-form severity label.
    pub severity: String,
    /// Canonical status: `Open`, `In Progress` or `Resolved`.
    pub status: String,
    /// Creation time, ISO-8601 in UTC.
    pub created_at: String,
}

impl From<&Bug> for BugResponse {
    fn from(bug: &Bug) -> Self {
        Self {
            id: bug.id.value(),
            title: bug.title.clone(),
            description: bug.description.clone(),
            severity: bug.severity.clone(),
            status: bug.status.as_str().to_string(),
            created_at: bug.created_at.to_iso8601(),
        }
    }
}

/// Plain message body, used for health checks and delete confirmations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable message.
    pub message: String,
}

impl MessageResponse {
    /// Creates a new message body.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// =============================================================================
// Body Decoding
// =============================================================================

/// Decodes a raw request body into an optional JSON value.
///
/// An empty body and a literal `null` both count as "no payload".
///
/// # Errors
///
/// Returns a 400 response if the body is not valid JSON.
pub fn decode_payload(body: &[u8]) -> Result<Option<Value>, ApiErrorResponse> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Null) => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(error) => Err(ApiErrorResponse::validation_error(format!(
            "Request body is not valid JSON: {error}"
        ))),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BugId, BugPatch, BugStatus, NewBug, Timestamp};
    use axum::http::StatusCode;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use serde_json::json;

    fn sample_bug() -> Bug {
        let created_at = Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 3, 9, 8, 0, 0).unwrap());
        NewBug::new("Crash on save", "App crashes", "High", created_at).into_bug(BugId::new(1))
    }

    #[rstest]
    fn test_bug_response_fields() {
        let response = BugResponse::from(&sample_bug());

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 1,
                "title": "Crash on save",
                "description": "App crashes",
                "severity": "High",
                "status": "Open",
                "created_at": "2024-03-09T08:00:00.000000Z"
            })
        );
    }

    #[rstest]
    fn test_bug_response_never_emits_alias() {
        let bug = sample_bug().apply(BugPatch {
            status: Some(BugStatus::InProgress),
            ..BugPatch::default()
        });
        assert_eq!(BugResponse::from(&bug).status, "In Progress");
    }

    #[rstest]
    #[case(b"")]
    #[case(b"   \n")]
    #[case(b"null")]
    fn test_decode_payload_absent(#[case] body: &[u8]) {
        assert_eq!(decode_payload(body).unwrap(), None);
    }

    #[rstest]
    fn test_decode_payload_object() {
        let decoded = decode_payload(br#"{"status": "Open"}"#).unwrap();
        assert_eq!(decoded, Some(json!({"status": "Open"})));
    }

    #[rstest]
    fn test_decode_payload_invalid_json() {
        let error = decode_payload(b"{not json").unwrap_err();
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
        assert_eq!(error.error.code, "VALIDATION_ERROR");
    }
}
