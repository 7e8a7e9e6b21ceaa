// ABOUTME: Storage operations for ignored MAC addresses
// ABOUTME: Clients on this list never trigger notifications

use sqlx::{Row, SqlitePool};

use crate::{StorageError, StorageResult};

pub struct IgnoredMacStorage {
    pool: SqlitePool,
}

impl IgnoredMacStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// MACs currently flagged as ignored
    pub async fn list(&self) -> StorageResult<Vec<String>> {
        let rows = sqlx::query("SELECT mac FROM ignored_macs WHERE ignore = 1 ORDER BY mac")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.into_iter()
            .map(|row| row.try_get("mac").map_err(StorageError::Sqlx))
            .collect()
    }

    pub async fn set_ignored(&self, mac: &str, ignore: bool) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO ignored_macs (mac, ignore)
            VALUES (?, ?)
            ON CONFLICT(mac) DO UPDATE SET ignore = excluded.ignore
            "#,
        )
        .bind(mac)
        .bind(ignore)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        Ok(())
    }
}
