// ABOUTME: Data layer and persistence for Client Watch
// ABOUTME: SQLite pool management and repositories for preferences, clients and ignored MACs

use thiserror::Error;

pub mod clients;
pub mod database;
pub mod ignored_macs;
pub mod preferences;

pub use clients::ClientStorage;
pub use database::Database;
pub use ignored_macs::IgnoredMacStorage;
pub use preferences::{PreferenceBackend, PreferenceRecord, PreferenceStorage};

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;
