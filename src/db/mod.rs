//! Persistence layer for the school diary.
//!
//! The module follows a repository pattern so storage backends can be
//! swapped without touching the HTTP layer:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  HTTP layer (axum handlers)                  │
//! └───────────────────┬─────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────┐
//! │  SchoolRepository trait (repository/)        │
//! └───────────────────┬─────────────────────────┘
//!                     │
//!     ┌───────────────┴───────────────┐
//!     │ LocalRepository │ SqliteRepository │
//!     │   (in-memory)   │  (Diesel + r2d2) │
//!     └───────────────────────────────┘
//! ```
//!
//! - [`models`]: domain entities and write records
//! - [`repository`]: trait definition and error types
//! - [`repositories`]: the two backend implementations
//! - [`config`] / [`factory`]: environment-driven construction
//!
//! # Usage
//!
//! ```ignore
//! use school_diary::db::{RepositoryFactory, RepositoryType, SqliteConfig};
//!
//! let config = SqliteConfig::from_env();
//! let repo = RepositoryFactory::create(RepositoryType::Sqlite, Some(&config))?;
//! let subjects = repo.list_subjects().await?;
//! ```

pub mod config;
pub mod factory;
pub mod models;
pub mod repositories;
pub mod repository;

pub use config::SqliteConfig;
pub use factory::{RepositoryFactory, RepositoryType};
pub use repository::{ErrorContext, RepositoryError, RepositoryResult, SchoolRepository};
