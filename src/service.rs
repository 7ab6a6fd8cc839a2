//! Bug record service.
//!
//! Sits between the HTTP handlers and the backing store: turns decoded
//! payloads into validated state transitions and hands them to the injected
//! repository. The service holds no state of its own beyond the repository
//! handle.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::domain::{
    Bug, BugId, PayloadError, Timestamp, new_bug_from_payload, patch_from_payload,
};
use crate::infrastructure::{BugRepository, RepositoryError};

// =============================================================================
// Service Error
// =============================================================================

/// Errors returned by [`BugService`].
#[derive(Debug, Error)]
pub enum BugError {
    /// Malformed or missing input, or an unrecognized status token.
    #[error(transparent)]
    Validation(#[from] PayloadError),

    /// The referenced bug does not exist.
    #[error("Bug {0} not found")]
    NotFound(BugId),

    /// The backing store failed.
    #[error("Persistence error: {0}")]
    Persistence(#[from] RepositoryError),
}

// =============================================================================
// Bug Service
// =============================================================================

/// Create, list, read, update, and delete operations over bug records.
#[derive(Clone)]
pub struct BugService {
    repository: Arc<dyn BugRepository>,
}

impl std::fmt::Debug for BugService {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("BugService")
            .field("repository", &"Arc<dyn BugRepository>")
            .finish()
    }
}

impl BugService {
    /// Creates a service backed by the given repository.
    #[must_use]
    pub const fn new(repository: Arc<dyn BugRepository>) -> Self {
        Self { repository }
    }

    /// Creates an open bug from a creation payload.
    ///
    /// # Errors
    ///
    /// - `BugError::Validation` if a required key is missing or not a string
    /// - `BugError::Persistence` if the store rejects the write
    pub async fn create(&self, payload: Option<&Value>) -> Result<Bug, BugError> {
        let new_bug = new_bug_from_payload(payload, Timestamp::now())?;
        let bug = self.repository.insert(new_bug).await?;

        tracing::info!(bug_id = %bug.id, severity = %bug.severity, "Bug created");
        Ok(bug)
    }

    /// Lists every bug, most recently created first.
    ///
    /// # Errors
    ///
    /// Returns `BugError::Persistence` if the store fails.
    pub async fn list(&self) -> Result<Vec<Bug>, BugError> {
        Ok(self.repository.list_newest_first().await?)
    }

    /// Returns a single bug.
    ///
    /// # Errors
    ///
    /// - `BugError::NotFound` if no bug has this ID
    /// - `BugError::Persistence` if the store fails
    pub async fn get(&self, id: BugId) -> Result<Bug, BugError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(BugError::NotFound(id))
    }

    /// Merges a partial update into an existing bug and persists it.
    ///
    /// The target is looked up before the payload is read. The payload is
    /// validated as a whole before anything is written, so a rejected status
    /// leaves the stored record untouched.
    ///
    /// # Errors
    ///
    /// - `BugError::NotFound` if no bug has this ID
    /// - `BugError::Validation` if the payload is empty or carries a bad value
    /// - `BugError::Persistence` if the store fails
    pub async fn update(&self, id: BugId, payload: Option<&Value>) -> Result<Bug, BugError> {
        tracing::debug!(bug_id = %id, ?payload, "Updating bug");

        let bug = self.get(id).await?;

        let patch = patch_from_payload(payload).inspect_err(|error| {
            if let PayloadError::InvalidStatus(invalid) = error {
                tracing::warn!(bug_id = %id, token = invalid.token(), "Rejected status token");
            }
        })?;
        if patch.is_empty() {
            tracing::debug!(bug_id = %id, "Payload names no known field, nothing to write");
            return Ok(bug);
        }
        if let Some(status) = patch.status {
            tracing::debug!(bug_id = %id, from = %bug.status, to = %status, "Status change");
        }

        let updated = bug.apply(patch);
        if !self.repository.update(updated.clone()).await? {
            // Deleted between the read and the write
            return Err(BugError::NotFound(id));
        }

        tracing::debug!(bug_id = %id, "Bug updated");
        Ok(updated)
    }

    /// Deletes a bug.
    ///
    /// Deleting an already deleted bug reports `NotFound` again.
    ///
    /// # Errors
    ///
    /// - `BugError::NotFound` if no bug has this ID
    /// - `BugError::Persistence` if the store fails
    pub async fn delete(&self, id: BugId) -> Result<(), BugError> {
        if !self.repository.delete(id).await? {
            return Err(BugError::NotFound(id));
        }

        tracing::info!(bug_id = %id, "Bug deleted");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
