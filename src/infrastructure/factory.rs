//! Repository factory for runtime backend selection.
//!
//! Creates the bug repository based on environment configuration, switching
//! between the in-memory and `PostgreSQL` backends at runtime.
//!
//! # Environment Variables
//!
//! - `STORAGE_MODE`: `in_memory` (default) | `postgres`
//! - `DATABASE_URL`: `PostgreSQL` connection URL (required when `STORAGE_MODE=postgres`)
//!
//! # Example
//!
//! ```ignore
//! let config = RepositoryConfig::from_env()?;
//! let repository = RepositoryFactory::new(config).create().await?;
//! let service = BugService::new(repository);
//! ```

use std::env;
use std::str::FromStr;
use std::sync::Arc;

use sqlx::PgPool;
use thiserror::Error;

use super::{BugRepository, InMemoryBugRepository, PostgresBugRepository, RepositoryError};

// =============================================================================
// Configuration Types
// =============================================================================

/// Storage mode for bug records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    /// Process-local storage. Suitable for testing and development.
    #[default]
    InMemory,
    /// `PostgreSQL` storage for production use.
    Postgres,
}

impl FromStr for StorageMode {
    type Err = ConfigurationError;

    /// Parses a storage mode from a string, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidStorageMode` if the string is not recognized.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            _ => Err(ConfigurationError::InvalidStorageMode(value.to_string())),
        }
    }
}

/// Configuration for the repository factory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryConfig {
    /// Storage backend.
    pub storage_mode: StorageMode,
    /// `PostgreSQL` connection URL (required when `storage_mode` is `Postgres`).
    pub database_url: Option<String>,
}

impl RepositoryConfig {
    /// Creates a configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if:
    /// - `STORAGE_MODE` contains an invalid value
    /// - `DATABASE_URL` is missing when `STORAGE_MODE=postgres`
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Creates a configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`RepositoryConfig::from_env`].
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigurationError> {
        let storage_mode = match lookup("STORAGE_MODE") {
            Some(value) if !value.trim().is_empty() => value.parse()?,
            _ => StorageMode::default(),
        };

        // Empty/whitespace-only counts as unset
        let database_url = lookup("DATABASE_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        let config = Self {
            storage_mode,
            database_url,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::MissingDatabaseUrl` if `PostgreSQL` is
    /// selected without a URL.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.storage_mode == StorageMode::Postgres && self.database_url.is_none() {
            return Err(ConfigurationError::MissingDatabaseUrl);
        }
        Ok(())
    }
}

// =============================================================================
// Error Types
// =============================================================================

/// Errors in the storage configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Invalid storage mode value.
    #[error("Invalid storage mode: '{0}'. Expected 'in_memory' or 'postgres'")]
    InvalidStorageMode(String),

    /// Missing `DATABASE_URL` when storage mode is Postgres.
    #[error("DATABASE_URL environment variable is required when STORAGE_MODE=postgres")]
    MissingDatabaseUrl,
}

/// Errors that can occur during factory initialization.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    DatabaseConnection(String),

    /// The database is reachable but the schema could not be prepared.
    #[error("Database initialization error: {0}")]
    DatabaseInitialization(#[from] RepositoryError),
}

// =============================================================================
// Repository Factory
// =============================================================================

/// Factory for creating the bug repository based on configuration.
#[derive(Debug, Clone)]
pub struct RepositoryFactory {
    config: RepositoryConfig,
}

impl RepositoryFactory {
    /// Creates a new repository factory with the given configuration.
    #[must_use]
    pub const fn new(config: RepositoryConfig) -> Self {
        Self { config }
    }

    /// Creates the repository.
    ///
    /// For `PostgreSQL` this connects, checks the connection, and creates the
    /// `bugs` table if needed.
    ///
    /// # Errors
    ///
    /// Returns `FactoryError` if the database connection or schema setup fails.
    pub async fn create(&self) -> Result<Arc<dyn BugRepository>, FactoryError> {
        match self.config.storage_mode {
            StorageMode::InMemory => Ok(Arc::new(InMemoryBugRepository::new())),
            StorageMode::Postgres => {
                let pool = self.create_postgres_pool().await?;
                let repository = PostgresBugRepository::new(pool);

                tracing::info!("Testing database connection");
                repository.ping().await?;
                repository.ensure_schema().await?;
                tracing::info!("Database connection successful, schema ready");

                Ok(Arc::new(repository))
            }
        }
    }

    /// Creates a `PostgreSQL` connection pool.
    async fn create_postgres_pool(&self) -> Result<PgPool, FactoryError> {
        let database_url = self
            .config
            .database_url
            .as_ref()
            .ok_or(ConfigurationError::MissingDatabaseUrl)?;

        PgPool::connect(database_url)
            .await
            .map_err(|error| FactoryError::DatabaseConnection(error.to_string()))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewBug, Timestamp};
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let variables: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |key| variables.get(key).cloned()
    }

    // -------------------------------------------------------------------------
    // StorageMode Tests
    // -------------------------------------------------------------------------

    #[rstest]
    #[case("in_memory", StorageMode::InMemory)]
    #[case("InMemory", StorageMode::InMemory)]
    #[case("memory", StorageMode::InMemory)]
    #[case("postgres", StorageMode::Postgres)]
    #[case("PostgreSQL", StorageMode::Postgres)]
    #[case("pg", StorageMode::Postgres)]
    fn test_storage_mode_from_str(#[case] input: &str, #[case] expected: StorageMode) {
        assert_eq!(input.parse::<StorageMode>(), Ok(expected));
    }

    #[rstest]
    fn test_storage_mode_invalid() {
        assert_eq!(
            "sqlite".parse::<StorageMode>(),
            Err(ConfigurationError::InvalidStorageMode("sqlite".to_string()))
        );
    }

    // -------------------------------------------------------------------------
    // RepositoryConfig Tests
    // -------------------------------------------------------------------------

    #[rstest]
    fn test_config_defaults_to_in_memory() {
        let config = RepositoryConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, RepositoryConfig::default());
    }

    #[rstest]
    fn test_config_postgres_with_url() {
        let config = RepositoryConfig::from_lookup(lookup_from(&[
            ("STORAGE_MODE", "postgres"),
            ("DATABASE_URL", " postgres://localhost/bugs "),
        ]))
        .unwrap();

        assert_eq!(config.storage_mode, StorageMode::Postgres);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/bugs")
        );
    }

    #[rstest]
    #[case(&[("STORAGE_MODE", "postgres")])]
    #[case(&[("STORAGE_MODE", "postgres"), ("DATABASE_URL", "   ")])]
    fn test_config_postgres_requires_url(#[case] pairs: &[(&str, &str)]) {
        assert_eq!(
            RepositoryConfig::from_lookup(lookup_from(pairs)),
            Err(ConfigurationError::MissingDatabaseUrl)
        );
    }

    // -------------------------------------------------------------------------
    // RepositoryFactory Tests
    // -------------------------------------------------------------------------

    #[rstest]
    #[tokio::test]
    async fn test_factory_creates_in_memory_repository() {
        let factory = RepositoryFactory::new(RepositoryConfig::default());
        let repository = factory.create().await.unwrap();

        let bug = repository
            .insert(NewBug::new("t", "d", "s", Timestamp::now()))
            .await
            .unwrap();
        assert_eq!(bug.id.value(), 1);
    }
}
