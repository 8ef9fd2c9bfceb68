//! Database configuration and environment variable handling.

use std::env;

/// Configuration for the embedded SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Path to the database file (created if absent)
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            database_url: "school_diary.sqlite3".to_string(),
            max_pool_size: 10,
            connection_timeout_sec: 30,
        }
    }
}

impl SqliteConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `DATABASE_URL`: Path to the SQLite database file
    ///   (default: `school_diary.sqlite3`)
    /// - `SQLITE_POOL_MAX`: Maximum pool size (default: 10)
    /// - `SQLITE_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let database_url = env::var("DATABASE_URL").unwrap_or(defaults.database_url);

        let max_pool_size = env::var("SQLITE_POOL_MAX")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(defaults.max_pool_size);

        let connection_timeout_sec = env::var("SQLITE_CONN_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.connection_timeout_sec);

        Self {
            database_url,
            max_pool_size,
            connection_timeout_sec,
        }
    }

    /// Configuration pointing at a specific database file.
    pub fn with_database_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Self::default()
        }
    }
}
