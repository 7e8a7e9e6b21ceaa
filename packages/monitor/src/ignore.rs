// ABOUTME: Set of MAC addresses that never trigger notifications
// ABOUTME: Held in memory and written through to the ignored_macs table

use clientwatch_core::normalize_mac;
use clientwatch_storage::{IgnoredMacStorage, StorageResult};
use std::collections::BTreeSet;
use std::sync::{PoisonError, RwLock};
use tokio::sync::Mutex;
use tracing::info;

pub struct IgnoreList {
    macs: RwLock<BTreeSet<String>>,
    storage: IgnoredMacStorage,
    write_lock: Mutex<()>,
}

impl IgnoreList {
    /// Load the persisted list
    pub async fn load(storage: IgnoredMacStorage) -> StorageResult<Self> {
        let macs: BTreeSet<String> = storage
            .list()
            .await?
            .iter()
            .map(|mac| normalize_mac(mac))
            .collect();
        info!("Loaded {} ignored MAC addresses", macs.len());

        Ok(Self {
            macs: RwLock::new(macs),
            storage,
            write_lock: Mutex::new(()),
        })
    }

    /// Returns false when `mac` was already ignored
    pub async fn ignore(&self, mac: &str) -> StorageResult<bool> {
        let mac = normalize_mac(mac);
        let _guard = self.write_lock.lock().await;

        if self.contains(&mac) {
            info!(mac = %mac, "MAC address already ignored");
            return Ok(false);
        }

        self.storage.set_ignored(&mac, true).await?;
        self.write().insert(mac.clone());
        info!(mac = %mac, "Ignoring MAC address");
        Ok(true)
    }

    /// Returns false when `mac` was not ignored
    pub async fn unignore(&self, mac: &str) -> StorageResult<bool> {
        let mac = normalize_mac(mac);
        let _guard = self.write_lock.lock().await;

        if !self.contains(&mac) {
            info!(mac = %mac, "MAC address is not ignored");
            return Ok(false);
        }

        self.storage.set_ignored(&mac, false).await?;
        self.write().remove(&mac);
        info!(mac = %mac, "No longer ignoring MAC address");
        Ok(true)
    }

    pub fn contains(&self, mac: &str) -> bool {
        self.macs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&normalize_mac(mac))
    }

    /// Sorted ignored MACs
    pub fn list(&self) -> Vec<String> {
        self.macs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, BTreeSet<String>> {
        self.macs.write().unwrap_or_else(PoisonError::into_inner)
    }
}
