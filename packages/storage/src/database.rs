// ABOUTME: Database connection management and schema initialization
// ABOUTME: Opens the SQLite pool and hands out per-table storage handles

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::{ClientStorage, IgnoredMacStorage, PreferenceStorage, StorageError, StorageResult};

/// Shared handle to the Client Watch database
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    location: String,
}

impl Database {
    /// Open (creating if needed) the database file at `path` and run migrations
    pub async fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path: PathBuf = path.as_ref().to_path_buf();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(StorageError::Io)?;
            }
        }

        debug!("Connecting to database: {}", path.display());

        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await
            .map_err(StorageError::Sqlx)?;

        info!("Database connection established");

        let database = Self {
            pool,
            location: path.display().to_string(),
        };
        database.migrate().await?;
        Ok(database)
    }

    /// Private in-memory database, used by tests and dry runs
    pub async fn in_memory() -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(StorageError::Sqlx)?
            .create_if_missing(true);

        // A single long-lived connection keeps the in-memory database alive
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(StorageError::Sqlx)?;

        let database = Self {
            pool,
            location: ":memory:".to_string(),
        };
        database.migrate().await?;
        Ok(database)
    }

    async fn migrate(&self) -> StorageResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(StorageError::Migration)?;

        debug!("Database migrations completed");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Human readable location (file path or `:memory:`)
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn preferences(&self) -> PreferenceStorage {
        PreferenceStorage::new(self.pool.clone())
    }

    pub fn clients(&self) -> ClientStorage {
        ClientStorage::new(self.pool.clone())
    }

    pub fn ignored_macs(&self) -> IgnoredMacStorage {
        IgnoredMacStorage::new(self.pool.clone())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
