//! Repository factory for explicit dependency construction.
//!
//! The binary builds one repository at startup and passes it down through
//! [`crate::http::AppState`]; nothing here is global.

use std::str::FromStr;
use std::sync::Arc;

use tracing::info;

use super::config::SqliteConfig;
use super::repositories::{LocalRepository, SqliteRepository};
use super::repository::{RepositoryError, RepositoryResult, SchoolRepository};

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// Embedded SQLite + Diesel implementation
    Sqlite,
    /// In-memory local repository
    Local,
}

impl FromStr for RepositoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" | "db" => Ok(Self::Sqlite),
            "local" | "memory" => Ok(Self::Local),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl RepositoryType {
    /// Get repository type from environment.
    ///
    /// Reads `REPOSITORY_TYPE`. Defaults to Sqlite when a `DATABASE_URL`
    /// is present, otherwise Local.
    pub fn from_env() -> Self {
        if let Ok(val) = std::env::var("REPOSITORY_TYPE") {
            return val.parse().unwrap_or(Self::Local);
        }

        if std::env::var("DATABASE_URL").is_ok() {
            Self::Sqlite
        } else {
            Self::Local
        }
    }
}

/// Factory for creating repository instances.
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository instance based on type.
    ///
    /// # Arguments
    /// * `repo_type` - Type of repository to create
    /// * `sqlite_config` - Database configuration (required for Sqlite)
    pub fn create(
        repo_type: RepositoryType,
        sqlite_config: Option<&SqliteConfig>,
    ) -> RepositoryResult<Arc<dyn SchoolRepository>> {
        match repo_type {
            RepositoryType::Sqlite => {
                let config = sqlite_config.ok_or_else(|| {
                    RepositoryError::configuration(
                        "Sqlite repository requires a SqliteConfig".to_string(),
                    )
                })?;
                info!(database_url = %config.database_url, "Creating SQLite repository");
                let repo = SqliteRepository::new(config)?;
                Ok(Arc::new(repo))
            }
            RepositoryType::Local => {
                info!("Creating in-memory repository");
                Ok(Arc::new(LocalRepository::new()))
            }
        }
    }

    /// Create a repository from environment configuration.
    pub fn create_from_env() -> RepositoryResult<Arc<dyn SchoolRepository>> {
        let repo_type = RepositoryType::from_env();
        let config = SqliteConfig::from_env();
        Self::create(repo_type, Some(&config))
    }

    /// Create an in-memory repository (convenience for tests).
    pub fn create_local() -> Arc<dyn SchoolRepository> {
        Arc::new(LocalRepository::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_repository_types() {
        assert_eq!("sqlite".parse::<RepositoryType>(), Ok(RepositoryType::Sqlite));
        assert_eq!("Local".parse::<RepositoryType>(), Ok(RepositoryType::Local));
        assert_eq!("memory".parse::<RepositoryType>(), Ok(RepositoryType::Local));
        assert!("mongodb".parse::<RepositoryType>().is_err());
    }

    #[test]
    fn create_local_returns_usable_repository() {
        let repo = RepositoryFactory::create_local();
        let rt = tokio::runtime::Runtime::new().unwrap();
        assert!(rt.block_on(repo.health_check()).unwrap());
    }
}
