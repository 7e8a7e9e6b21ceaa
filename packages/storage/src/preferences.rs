// ABOUTME: Storage operations for preferences
// ABOUTME: Backend trait consumed by the preference store plus its SQLite implementation

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use crate::{StorageError, StorageResult};

/// A preference row as stored. Secure values hold encoded ciphertext
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceRecord {
    pub name: String,
    pub value: String,
    pub secure: bool,
}

/// Durable store behind the in-memory preference map
#[async_trait]
pub trait PreferenceBackend: Send + Sync {
    /// Create the schema if it does not exist yet
    async fn initialize(&self) -> StorageResult<()>;

    /// Full table scan
    async fn load_all(&self) -> StorageResult<Vec<PreferenceRecord>>;

    /// Insert or replace the row keyed by `record.name`
    async fn upsert(&self, record: &PreferenceRecord) -> StorageResult<()>;
}

pub struct PreferenceStorage {
    pool: SqlitePool,
}

impl PreferenceStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PreferenceBackend for PreferenceStorage {
    async fn initialize(&self) -> StorageResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(StorageError::Migration)
    }

    async fn load_all(&self) -> StorageResult<Vec<PreferenceRecord>> {
        let rows = sqlx::query("SELECT name, value, secure FROM preferences ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.into_iter()
            .map(|row| {
                Ok(PreferenceRecord {
                    name: row.try_get("name").map_err(StorageError::Sqlx)?,
                    value: row.try_get("value").map_err(StorageError::Sqlx)?,
                    secure: row.try_get("secure").map_err(StorageError::Sqlx)?,
                })
            })
            .collect()
    }

    async fn upsert(&self, record: &PreferenceRecord) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO preferences (name, value, secure)
            VALUES (?, ?, ?)
            ON CONFLICT(name) DO UPDATE SET
                value = excluded.value,
                secure = excluded.secure,
                updated_at = datetime('now', 'utc')
            "#,
        )
        .bind(&record.name)
        .bind(&record.value)
        .bind(record.secure)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        Ok(())
    }
}
