//! In-memory repository implementation.
//!
//! Suitable for development and testing. Data lives for the lifetime of the
//! process only.
//!
//! # Features
//!
//! - Thread-safe with `Arc<RwLock<...>>`
//! - Sequential identifiers starting at 1, never reused after deletion

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::RwLock;

use crate::domain::{Bug, BugId, NewBug};
use crate::infrastructure::{BugRepository, RepositoryError};

/// Rows plus the identifier sequence, guarded together.
#[derive(Debug, Default)]
struct BugTable {
    rows: BTreeMap<BugId, Bug>,
    last_id: i64,
}

/// In-memory implementation of `BugRepository`.
///
/// Clones share the same underlying table.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBugRepository {
    table: Arc<RwLock<BugTable>>,
}

impl InMemoryBugRepository {
    /// Creates a new empty in-memory bug repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[allow(clippy::significant_drop_tightening)]
impl BugRepository for InMemoryBugRepository {
    fn insert(&self, bug: NewBug) -> BoxFuture<'_, Result<Bug, RepositoryError>> {
        Box::pin(async move {
            let mut guard = self.table.write().await;
            guard.last_id += 1;
            let bug = bug.into_bug(BugId::new(guard.last_id));
            guard.rows.insert(bug.id, bug.clone());
            Ok(bug)
        })
    }

    fn find_by_id(&self, id: BugId) -> BoxFuture<'_, Result<Option<Bug>, RepositoryError>> {
        Box::pin(async move {
            let guard = self.table.read().await;
            Ok(guard.rows.get(&id).cloned())
        })
    }

    fn list_newest_first(&self) -> BoxFuture<'_, Result<Vec<Bug>, RepositoryError>> {
        Box::pin(async move {
            let guard = self.table.read().await;
            let mut bugs: Vec<Bug> = guard.rows.values().cloned().collect();
            drop(guard);

            bugs.sort_by(|left, right| {
                right
                    .created_at
                    .cmp(&left.created_at)
                    .then_with(|| right.id.cmp(&left.id))
            });
            Ok(bugs)
        })
    }

    fn update(&self, bug: Bug) -> BoxFuture<'_, Result<bool, RepositoryError>> {
        Box::pin(async move {
            let mut guard = self.table.write().await;
            match guard.rows.get_mut(&bug.id) {
                Some(existing) => {
                    existing.title = bug.title;
                    existing.description = bug.description;
                    existing.severity = bug.severity;
                    existing.status = bug.status;
                    Ok(true)
                }
                None => Ok(false),
            }
        })
    }

    fn delete(&self, id: BugId) -> BoxFuture<'_, Result<bool, RepositoryError>> {
        Box::pin(async move {
            let mut guard = self.table.write().await;
            Ok(guard.rows.remove(&id).is_some())
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
