//! `PostgreSQL` repository implementation.
//!
//! Uses `sqlx` with a connection pool. Every operation is a single statement,
//! so each one commits atomically without an explicit transaction.
//!
//! # Table Schema
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS bugs (
//!     id BIGSERIAL PRIMARY KEY,
//!     title TEXT NOT NULL,
//!     description TEXT NOT NULL,
//!     severity TEXT NOT NULL,
//!     status VARCHAR(20) NOT NULL DEFAULT 'open'
//!         CHECK (status IN ('open', 'in_progress', 'resolved')),
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use sqlx::PgPool;

use crate::domain::{Bug, BugId, BugStatus, NewBug, Timestamp};
use crate::infrastructure::{BugRepository, RepositoryError};

/// DDL executed by [`PostgresBugRepository::ensure_schema`].
pub const CREATE_BUGS_TABLE: &str = "\
CREATE TABLE IF NOT EXISTS bugs (
    id BIGSERIAL PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    severity TEXT NOT NULL,
    status VARCHAR(20) NOT NULL DEFAULT 'open'
        CHECK (status IN ('open', 'in_progress', 'resolved')),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)";

const SELECT_COLUMNS: &str = "id, title, description, severity, status, created_at";

// =============================================================================
// Helper Functions for DB String Conversion
// =============================================================================

/// Converts `BugStatus` to its database string representation.
///
/// The stored form is independent of the external display vocabulary.
const fn status_to_database_string(status: BugStatus) -> &'static str {
    match status {
        BugStatus::Open => "open",
        BugStatus::InProgress => "in_progress",
        BugStatus::Resolved => "resolved",
    }
}

/// Parses a stored status string.
fn status_from_database_string(value: &str) -> Result<BugStatus, RepositoryError> {
    match value {
        "open" => Ok(BugStatus::Open),
        "in_progress" => Ok(BugStatus::InProgress),
        "resolved" => Ok(BugStatus::Resolved),
        other => Err(RepositoryError::SerializationError(format!(
            "unknown stored status '{other}'"
        ))),
    }
}

/// A `bugs` row as returned by `SELECT_COLUMNS`.
type BugRow = (i64, String, String, String, String, DateTime<Utc>);

fn bug_from_row(row: BugRow) -> Result<Bug, RepositoryError> {
    let (id, title, description, severity, status, created_at) = row;
    Ok(Bug {
        id: BugId::new(id),
        title,
        description,
        severity,
        status: status_from_database_string(&status)?,
        created_at: Timestamp::from_datetime(created_at),
    })
}

#[allow(clippy::needless_pass_by_value)]
fn database_error(error: sqlx::Error) -> RepositoryError {
    RepositoryError::DatabaseError(error.to_string())
}

// =============================================================================
// PostgreSQL Bug Repository
// =============================================================================

/// `PostgreSQL` implementation of `BugRepository`.
///
/// # Example
///
/// ```ignore
/// let pool = PgPool::connect("postgres://localhost/bugtrackr").await?;
/// let repository = PostgresBugRepository::new(pool);
/// repository.ensure_schema().await?;
/// let bug = repository.insert(NewBug::new("t", "d", "High", Timestamp::now())).await?;
/// ```
#[derive(Debug, Clone)]
pub struct PostgresBugRepository {
    /// Connection pool for `PostgreSQL`.
    pool: PgPool,
}

impl PostgresBugRepository {
    /// Creates a new `PostgreSQL` bug repository with the given connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the `bugs` table if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DatabaseError` if the statement fails.
    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        sqlx::query(CREATE_BUGS_TABLE)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;
        Ok(())
    }

    /// Runs a trivial query to check connectivity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DatabaseError` if the database is unreachable.
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(database_error)?;
        Ok(())
    }
}

impl BugRepository for PostgresBugRepository {
    fn insert(&self, bug: NewBug) -> BoxFuture<'_, Result<Bug, RepositoryError>> {
        Box::pin(async move {
            let row: BugRow = sqlx::query_as(&format!(
                "INSERT INTO bugs (title, description, severity, status, created_at) \
                 VALUES ($1, $2, $3, $4, $5) \
                 RETURNING {SELECT_COLUMNS}"
            ))
            .bind(&bug.title)
            .bind(&bug.description)
            .bind(&bug.severity)
            .bind(status_to_database_string(bug.status))
            .bind(bug.created_at.as_datetime())
            .fetch_one(&self.pool)
            .await
            .map_err(database_error)?;

            bug_from_row(row)
        })
    }

    fn find_by_id(&self, id: BugId) -> BoxFuture<'_, Result<Option<Bug>, RepositoryError>> {
        Box::pin(async move {
            let row: Option<BugRow> =
                sqlx::query_as(&format!("SELECT {SELECT_COLUMNS} FROM bugs WHERE id = $1"))
                    .bind(id.value())
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(database_error)?;

            row.map(bug_from_row).transpose()
        })
    }

    fn list_newest_first(&self) -> BoxFuture<'_, Result<Vec<Bug>, RepositoryError>> {
        Box::pin(async move {
            let rows: Vec<BugRow> = sqlx::query_as(&format!(
                "SELECT {SELECT_COLUMNS} FROM bugs ORDER BY created_at DESC, id DESC"
            ))
            .fetch_all(&self.pool)
            .await
            .map_err(database_error)?;

            rows.into_iter().map(bug_from_row).collect()
        })
    }

    fn update(&self, bug: Bug) -> BoxFuture<'_, Result<bool, RepositoryError>> {
        Box::pin(async move {
            let result = sqlx::query(
                "UPDATE bugs SET title = $1, description = $2, severity = $3, status = $4 \
                 WHERE id = $5",
            )
            .bind(&bug.title)
            .bind(&bug.description)
            .bind(&bug.severity)
            .bind(status_to_database_string(bug.status))
            .bind(bug.id.value())
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

            Ok(result.rows_affected() > 0)
        })
    }

    fn delete(&self, id: BugId) -> BoxFuture<'_, Result<bool, RepositoryError>> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM bugs WHERE id = $1")
                .bind(id.value())
                .execute(&self.pool)
                .await
                .map_err(database_error)?;

            Ok(result.rows_affected() > 0)
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
