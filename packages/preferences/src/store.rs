// ABOUTME: In-memory preference map backed by a durable store
// ABOUTME: Transparent encryption of secure values and ordered change watchers

use clientwatch_security::SecureValueCodec;
use clientwatch_storage::{PreferenceBackend, PreferenceRecord};
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

use crate::error::PreferenceError;
use crate::types::{PreferenceSnapshot, PreferenceView, SECRET_MASK};

/// Callback invoked with `(old, new)` after a preference has been committed
pub type Watcher = Arc<dyn Fn(Option<String>, String) -> BoxFuture<'static, ()> + Send + Sync>;

/// Value as held in memory. Secure values stay encoded ciphertext
#[derive(Debug, Clone)]
struct StoredPreference {
    value: String,
    secure: bool,
}

pub struct PreferenceStore {
    codec: SecureValueCodec,
    preferences: RwLock<HashMap<String, StoredPreference>>,
    watchers: RwLock<HashMap<String, Vec<Watcher>>>,
    backend: RwLock<Option<Arc<dyn PreferenceBackend>>>,
    /// Serializes writers so the durable and in-memory order agree
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("len", &read(&self.preferences).len())
            .field("backed", &read(&self.backend).is_some())
            .finish()
    }
}

impl PreferenceStore {
    /// Memory-only store. Call [`set_backing_store`](Self::set_backing_store) before use
    pub fn new(codec: SecureValueCodec) -> Self {
        Self {
            codec,
            preferences: RwLock::new(HashMap::new()),
            watchers: RwLock::new(HashMap::new()),
            backend: RwLock::new(None),
            write_lock: Mutex::new(()),
        }
    }

    /// Create a store and load everything persisted in `backend`
    pub async fn open(
        codec: SecureValueCodec,
        backend: Arc<dyn PreferenceBackend>,
    ) -> Result<Self, PreferenceError> {
        let store = Self::new(codec);
        store.set_backing_store(backend).await?;
        Ok(store)
    }

    /// One-time initialization: create the schema if needed and load all rows.
    ///
    /// Every secure row is authenticated while loading, so a tampered value or a
    /// passphrase mismatch fails here rather than on first read.
    pub async fn set_backing_store(
        &self,
        backend: Arc<dyn PreferenceBackend>,
    ) -> Result<(), PreferenceError> {
        let _guard = self.write_lock.lock().await;

        if read(&self.backend).is_some() {
            return Err(PreferenceError::BackingStoreAlreadySet);
        }

        backend.initialize().await.map_err(PreferenceError::Load)?;
        let records = backend.load_all().await.map_err(PreferenceError::Load)?;

        let mut loaded = HashMap::with_capacity(records.len());
        for record in records {
            if record.secure {
                self.codec
                    .decrypt_from_string(&record.value)
                    .map_err(|source| PreferenceError::Integrity {
                        name: record.name.clone(),
                        source,
                    })?;
            }
            loaded.insert(
                record.name,
                StoredPreference {
                    value: record.value,
                    secure: record.secure,
                },
            );
        }

        info!("Loaded {} preferences from backing store", loaded.len());

        write(&self.preferences).extend(loaded);
        *write(&self.backend) = Some(backend);
        Ok(())
    }

    /// Plaintext value of `name`, or `None` when it has never been set
    pub fn get(&self, name: &str) -> Result<Option<String>, PreferenceError> {
        let stored = match read(&self.preferences).get(name) {
            Some(stored) => stored.clone(),
            None => return Ok(None),
        };
        self.reveal(name, &stored).map(Some)
    }

    pub fn is_secure(&self, name: &str) -> Option<bool> {
        read(&self.preferences).get(name).map(|p| p.secure)
    }

    /// Store `value`, persist it, then run the watchers registered for `name`.
    ///
    /// Watchers only run after the backing store accepted the write. A
    /// persistence failure leaves the in-memory value untouched.
    ///
    /// Writers are serialized but watcher runs are not, so a watcher may call
    /// `set` itself. Concurrent writes to the same name can therefore notify
    /// out of commit order; watchers that care about the current value should
    /// read it back with [`get`](Self::get) rather than trust `new`.
    pub async fn set(&self, name: &str, value: &str, secure: bool) -> Result<(), PreferenceError> {
        let guard = self.write_lock.lock().await;
        let old = self.commit(&guard, name, value, secure).await?;
        drop(guard);

        self.notify(name, old, value).await;
        Ok(())
    }

    /// Set `name` only when it has no value yet. Returns whether it was written
    pub async fn set_default_preference(
        &self,
        name: &str,
        value: &str,
        secure: bool,
    ) -> Result<bool, PreferenceError> {
        let guard = self.write_lock.lock().await;
        if read(&self.preferences).contains_key(name) {
            return Ok(false);
        }

        debug!(name = %name, secure, "Seeding default preference");
        let old = self.commit(&guard, name, value, secure).await?;
        drop(guard);

        self.notify(name, old, value).await;
        Ok(true)
    }

    /// Register a callback for future changes of `name`.
    ///
    /// Watchers run in registration order and `set` waits for all of them.
    pub fn add_watcher<F, Fut>(&self, name: &str, watcher: F)
    where
        F: Fn(Option<String>, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let watcher: Watcher = Arc::new(move |old, new| Box::pin(watcher(old, new)));
        write(&self.watchers)
            .entry(name.to_string())
            .or_default()
            .push(watcher);
    }

    /// Plaintext copy of every preference
    pub fn snapshot(&self) -> Result<PreferenceSnapshot, PreferenceError> {
        let entries: Vec<(String, StoredPreference)> = read(&self.preferences)
            .iter()
            .map(|(name, stored)| (name.clone(), stored.clone()))
            .collect();

        entries
            .into_iter()
            .map(|(name, stored)| {
                let value = self.reveal(&name, &stored)?;
                Ok((name, value))
            })
            .collect()
    }

    /// Every preference sorted by name with secure values masked
    pub fn list_masked(&self) -> Vec<PreferenceView> {
        let mut views: Vec<PreferenceView> = read(&self.preferences)
            .iter()
            .map(|(name, stored)| PreferenceView {
                name: name.clone(),
                value: if stored.secure {
                    SECRET_MASK.to_string()
                } else {
                    stored.value.clone()
                },
                secure: stored.secure,
            })
            .collect();
        views.sort_by(|a, b| a.name.cmp(&b.name));
        views
    }

    /// Write through to the backend and memory. Caller must hold the write lock
    async fn commit(
        &self,
        _guard: &MutexGuard<'_, ()>,
        name: &str,
        value: &str,
        secure: bool,
    ) -> Result<Option<String>, PreferenceError> {
        let old = self.get(name)?;

        let stored = if secure {
            StoredPreference {
                value: self.codec.encrypt_to_string(value).map_err(|source| {
                    PreferenceError::Encryption {
                        name: name.to_string(),
                        source,
                    }
                })?,
                secure: true,
            }
        } else {
            StoredPreference {
                value: value.to_string(),
                secure: false,
            }
        };

        let backend = read(&self.backend).clone();
        match backend {
            Some(backend) => {
                backend
                    .upsert(&PreferenceRecord {
                        name: name.to_string(),
                        value: stored.value.clone(),
                        secure,
                    })
                    .await
                    .map_err(|source| PreferenceError::Persistence {
                        name: name.to_string(),
                        source,
                    })?;
            }
            None => warn!(name = %name, "No backing store set, preference kept in memory only"),
        }

        write(&self.preferences).insert(name.to_string(), stored);
        debug!(name = %name, secure, "Preference committed");
        Ok(old)
    }

    /// Runs the watchers on their own task so a dropped caller cannot skip them
    async fn notify(&self, name: &str, old: Option<String>, new: &str) {
        let watchers: Vec<Watcher> = read(&self.watchers)
            .get(name)
            .cloned()
            .unwrap_or_default();
        if watchers.is_empty() {
            return;
        }

        let new = new.to_string();
        let run = tokio::spawn(async move {
            for watcher in watchers {
                watcher(old.clone(), new.clone()).await;
            }
        });
        if let Err(e) = run.await {
            error!(name = %name, "Preference watcher failed: {}", e);
        }
    }

    fn reveal(&self, name: &str, stored: &StoredPreference) -> Result<String, PreferenceError> {
        if !stored.secure {
            return Ok(stored.value.clone());
        }
        self.codec
            .decrypt_from_string(&stored.value)
            .map_err(|source| PreferenceError::Integrity {
                name: name.to_string(),
                source,
            })
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
