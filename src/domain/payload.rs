//! Field-by-field extraction of decoded request payloads.
//!
//! Payloads arrive as already-decoded JSON values (or nothing at all). This
//! module turns them into a [`NewBug`] or a [`BugPatch`], applying the
//! key-presence and status vocabulary rules. Unrecognized keys are ignored.

use serde_json::{Map, Value};
use thiserror::Error;

use super::bug::{BugPatch, BugStatus, InvalidStatus, NewBug, Timestamp};

/// Keys that must be present in a creation payload.
pub const REQUIRED_FIELDS: [&str; 3] = ["title", "description", "severity"];

/// Errors produced while reading a payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    /// A creation payload is absent, not an object, or lacks a required key.
    #[error("Missing required fields: title, description, severity")]
    MissingRequiredFields,

    /// An update payload is absent, not an object, or empty.
    #[error("No data provided")]
    NoData,

    /// A text field carries a non-string JSON value.
    #[error("Field '{0}' must be a string")]
    NotAString(&'static str),

    /// The status token is outside the accepted vocabulary.
    #[error(transparent)]
    InvalidStatus(#[from] InvalidStatus),
}

/// Builds an open bug from a creation payload.
///
/// Only key presence is checked; empty strings are accepted.
///
/// # Errors
///
/// - [`PayloadError::MissingRequiredFields`] if the payload is absent, is not
///   an object, or lacks one of [`REQUIRED_FIELDS`]
/// - [`PayloadError::NotAString`] if a required value is not a string
pub fn new_bug_from_payload(
    payload: Option<&Value>,
    created_at: Timestamp,
) -> Result<NewBug, PayloadError> {
    let fields = payload
        .and_then(Value::as_object)
        .filter(|fields| REQUIRED_FIELDS.iter().all(|key| fields.contains_key(*key)))
        .ok_or(PayloadError::MissingRequiredFields)?;

    Ok(NewBug::new(
        required_text(fields, "title")?,
        required_text(fields, "description")?,
        required_text(fields, "severity")?,
        created_at,
    ))
}

/// Builds a partial update from an update payload.
///
/// The whole payload is validated before anything is returned, so a bad
/// status never yields a half-applied patch.
///
/// # Errors
///
/// - [`PayloadError::NoData`] if the payload is absent, is not an object, or is empty
/// - [`PayloadError::NotAString`] if a text field is not a string
/// - [`PayloadError::InvalidStatus`] if `status` is not an accepted token
pub fn patch_from_payload(payload: Option<&Value>) -> Result<BugPatch, PayloadError> {
    let fields = payload
        .and_then(Value::as_object)
        .filter(|fields| !fields.is_empty())
        .ok_or(PayloadError::NoData)?;

    Ok(BugPatch {
        title: optional_text(fields, "title")?,
        description: optional_text(fields, "description")?,
        severity: optional_text(fields, "severity")?,
        status: fields.get("status").map(status_from_value).transpose()?,
    })
}

/// Normalizes a JSON status value.
///
/// Non-string values are rejected with their JSON text as the offending token.
fn status_from_value(value: &Value) -> Result<BugStatus, InvalidStatus> {
    match value {
        Value::String(token) => BugStatus::normalize(token),
        other => Err(InvalidStatus::new(other.to_string())),
    }
}

fn required_text(fields: &Map<String, Value>, key: &'static str) -> Result<String, PayloadError> {
    optional_text(fields, key)?.ok_or(PayloadError::MissingRequiredFields)
}

fn optional_text(
    fields: &Map<String, Value>,
    key: &'static str,
) -> Result<Option<String>, PayloadError> {
    match fields.get(key) {
        None => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(_) => Err(PayloadError::NotAString(key)),
    }
}

// =============================================================================
// Tests
// =============================================================================
