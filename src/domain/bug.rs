//! Bug domain model.
//!
//! This module contains the bug record entity, its value objects, and the
//! tolerant status vocabulary shared by the display and storage layers.

use std::str::FromStr;

use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};
use thiserror::Error;

// =============================================================================
// Value Objects - Newtypes
// =============================================================================

/// Unique identifier for a bug.
///
/// Identifiers are assigned by the backing store when a bug is first
/// persisted and never change afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BugId(i64);

impl BugId {
    /// Creates a `BugId` from a raw store identifier.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw identifier.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl From<i64> for BugId {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Display for BugId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// A UTC timestamp with microsecond precision.
///
/// Sub-microsecond digits never survive construction, so every backend stores
/// and returns exactly the same instant. [`Timestamp::from_datetime`] drops
/// them; [`Timestamp::now`] rounds up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a `Timestamp` from a `DateTime<Utc>`.
    #[must_use]
    pub fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(datetime.trunc_subsecs(6))
    }

    /// Returns the inner `DateTime<Utc>`.
    #[must_use]
    pub const fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Returns the current time as a `Timestamp`.
    ///
    /// The clock reading is rounded up to the next whole microsecond, so the
    /// result is never earlier than any clock reading taken before the call.
    #[must_use]
    pub fn now() -> Self {
        Self::ceil_to_micros(Utc::now())
    }

    fn ceil_to_micros(datetime: DateTime<Utc>) -> Self {
        let truncated = datetime.trunc_subsecs(6);
        if truncated == datetime {
            Self(truncated)
        } else {
            Self(truncated + Duration::microseconds(1))
        }
    }

    /// Formats the timestamp as ISO-8601 with a `Z` suffix.
    #[must_use]
    pub fn to_iso8601(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.to_iso8601())
    }
}

// =============================================================================
// Status
// =============================================================================

/// Error returned when a status token is outside the accepted vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid status: \"{token}\". Must be: Open, Progress/In Progress, or Resolved")]
pub struct InvalidStatus {
    token: String,
}

impl InvalidStatus {
    /// Creates an error for the given offending token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Returns the rejected token exactly as received.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

/// The workflow status of a bug.
///
/// Every status may move to every other status; there is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BugStatus {
    /// Newly reported, nobody is working on it.
    #[default]
    Open,
    /// Somebody is working on it.
    InProgress,
    /// Fixed.
    Resolved,
}

impl BugStatus {
    /// All statuses, in workflow order.
    pub const ALL: [Self; 3] = [Self::Open, Self::InProgress, Self::Resolved];

    /// Maps an external status token onto a status.
    ///
    /// Matching is exact and case-sensitive. `"Progress"` is accepted as an
    /// alias of `"In Progress"` because the display layer uses the short form.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidStatus`] carrying the token verbatim for anything else.
    pub fn normalize(token: &str) -> Result<Self, InvalidStatus> {
        match token {
            "Open" => Ok(Self::Open),
            "In Progress" | "Progress" => Ok(Self::InProgress),
            "Resolved" => Ok(Self::Resolved),
            other => Err(InvalidStatus::new(other)),
        }
    }

    /// Returns the canonical external form of the status.
    ///
    /// The alias `"Progress"` is never produced.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
        }
    }
}

impl FromStr for BugStatus {
    type Err = InvalidStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::normalize(value)
    }
}

impl std::fmt::Display for BugStatus {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

// =============================================================================
// Bug
// =============================================================================

/// A bug that has not been persisted yet.
///
/// The store turns it into a [`Bug`] by assigning an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBug {
    /// Short summary.
    pub title: String,
    /// Full description.
    pub description: String,
    /// Free-form severity label.
    pub severity: String,
    /// Initial status, always [`BugStatus::Open`] when built through [`NewBug::new`].
    pub status: BugStatus,
    /// Creation time.
    pub created_at: Timestamp,
}

impl NewBug {
    /// Creates an open bug reported at `created_at`.
    ///
    /// Values are taken as given, empty strings included.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        severity: impl Into<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: severity.into(),
            status: BugStatus::Open,
            created_at,
        }
    }

    /// Attaches the store-assigned identifier.
    #[must_use]
    pub fn into_bug(self, id: BugId) -> Bug {
        Bug {
            id,
            title: self.title,
            description: self.description,
            severity: self.severity,
            status: self.status,
            created_at: self.created_at,
        }
    }
}

/// A persisted bug record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bug {
    /// Store-assigned identifier.
    pub id: BugId,
    /// Short summary.
    pub title: String,
    /// Full description.
    pub description: String,
    /// Free-form severity label.
    pub severity: String,
    /// Current status.
    pub status: BugStatus,
    /// Creation time.
    pub created_at: Timestamp,
}

impl Bug {
    /// Returns a new bug with every field present in `patch` replaced.
    ///
    /// `id` and `created_at` are never touched.
    #[must_use]
    pub fn apply(self, patch: BugPatch) -> Self {
        Self {
            title: patch.title.unwrap_or(self.title),
            description: patch.description.unwrap_or(self.description),
            severity: patch.severity.unwrap_or(self.severity),
            status: patch.status.unwrap_or(self.status),
            ..self
        }
    }
}

/// A validated partial update.
///
/// `None` means "leave the field as it is".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BugPatch {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New severity.
    pub severity: Option<String>,
    /// New status, already normalized.
    pub status: Option<BugStatus>,
}

impl BugPatch {
    /// Returns `true` if the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.severity.is_none()
            && self.status.is_none()
    }
}

// =============================================================================
// Tests
// =============================================================================
