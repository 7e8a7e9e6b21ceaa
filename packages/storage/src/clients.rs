// ABOUTME: Storage operations for the last known client list
// ABOUTME: Replaced wholesale after every successful poll

use clientwatch_core::Client;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::{StorageError, StorageResult};

pub struct ClientStorage {
    pool: SqlitePool,
}

impl ClientStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Clients in the order they were last written
    pub async fn list(&self) -> StorageResult<Vec<Client>> {
        let rows = sqlx::query("SELECT name, ip, mac, vendor, online FROM clients ORDER BY rowid")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.into_iter()
            .map(|row| {
                Ok(Client {
                    name: row.try_get("name").map_err(StorageError::Sqlx)?,
                    ip: row.try_get("ip").map_err(StorageError::Sqlx)?,
                    mac: row.try_get("mac").map_err(StorageError::Sqlx)?,
                    vendor: row.try_get("vendor").map_err(StorageError::Sqlx)?,
                    online: row.try_get("online").map_err(StorageError::Sqlx)?,
                })
            })
            .collect()
    }

    /// Replace the stored list with `clients` in one transaction
    pub async fn replace_all(&self, clients: &[Client]) -> StorageResult<()> {
        let mut tx = self.pool.begin().await.map_err(StorageError::Sqlx)?;

        sqlx::query("DELETE FROM clients")
            .execute(&mut *tx)
            .await
            .map_err(StorageError::Sqlx)?;

        for client in clients {
            sqlx::query(
                r#"
                INSERT INTO clients (name, ip, mac, vendor, online)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT(mac) DO UPDATE SET
                    name = excluded.name,
                    ip = excluded.ip,
                    vendor = excluded.vendor,
                    online = excluded.online,
                    updated_at = datetime('now', 'utc')
                "#,
            )
            .bind(&client.name)
            .bind(&client.ip)
            .bind(&client.mac)
            .bind(&client.vendor)
            .bind(client.online)
            .execute(&mut *tx)
            .await
            .map_err(StorageError::Sqlx)?;
        }

        tx.commit().await.map_err(StorageError::Sqlx)?;

        debug!("Stored {} clients", clients.len());
        Ok(())
    }
}
