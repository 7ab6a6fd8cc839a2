//! Repository trait for bug records.
//!
//! The trait is object safe so that the backend can be picked at runtime and
//! swapped for a test double. Every method returns a boxed future.

use futures::future::BoxFuture;
use thiserror::Error;

use crate::domain::{Bug, BugId, NewBug};

// =============================================================================
// Repository Error
// =============================================================================

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Database connection or statement error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A stored row could not be turned back into a bug.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// =============================================================================
// Bug Repository
// =============================================================================

/// Repository trait for bug records.
///
/// Each method is a single statement against the store, so every call is
/// atomic on its own. Concurrent updates to the same record are last writer
/// wins.
pub trait BugRepository: Send + Sync {
    /// Persists a new bug and returns it with its store-assigned identifier.
    fn insert(&self, bug: NewBug) -> BoxFuture<'_, Result<Bug, RepositoryError>>;

    /// Finds a bug by its ID.
    ///
    /// Returns `Ok(None)` if no such bug exists.
    fn find_by_id(&self, id: BugId) -> BoxFuture<'_, Result<Option<Bug>, RepositoryError>>;

    /// Lists all bugs, most recently created first.
    ///
    /// Bugs sharing a creation time are ordered by descending ID.
    fn list_newest_first(&self) -> BoxFuture<'_, Result<Vec<Bug>, RepositoryError>>;

    /// Overwrites the mutable fields of an existing bug.
    ///
    /// Returns `Ok(false)` if the bug does not exist; nothing is created.
    fn update(&self, bug: Bug) -> BoxFuture<'_, Result<bool, RepositoryError>>;

    /// Deletes a bug by its ID.
    ///
    /// Returns `Ok(true)` if the bug was deleted, `Ok(false)` if it didn't exist.
    fn delete(&self, id: BugId) -> BoxFuture<'_, Result<bool, RepositoryError>>;
}

// =============================================================================
// Tests
// =============================================================================
