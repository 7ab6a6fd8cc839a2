//! Infrastructure module for external services.
//!
//! This module contains the bug repository trait, its in-memory and
//! `PostgreSQL` implementations, and the factory that picks one at runtime.

pub mod factory;
pub mod in_memory;
pub mod postgres;
pub mod repository;

pub use factory::{
    ConfigurationError, FactoryError, RepositoryConfig, RepositoryFactory, StorageMode,
};
pub use in_memory::InMemoryBugRepository;
pub use postgres::PostgresBugRepository;
pub use repository::{BugRepository, RepositoryError};
