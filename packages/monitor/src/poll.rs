// ABOUTME: The periodic client poll
// ABOUTME: Lists clients from the device, notifies on arrivals and persists the result

use async_trait::async_trait;
use clientwatch_config::keys;
use clientwatch_core::{normalize_mac, Client};
use clientwatch_device::DeviceClient;
use clientwatch_notifications::Notifier;
use clientwatch_preferences::PreferenceStore;
use clientwatch_scheduler::ScheduledTask;
use clientwatch_storage::{ClientStorage, StorageResult};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

use crate::diff::{diff_clients, ClientEvent};
use crate::fatal::FatalReporter;
use crate::ignore::IgnoreList;
use crate::{MonitorError, MonitorResult};

pub struct ClientMonitor {
    preferences: Arc<PreferenceStore>,
    device: Arc<dyn DeviceClient>,
    notifier: Arc<dyn Notifier>,
    ignore: Arc<IgnoreList>,
    storage: ClientStorage,
    clients: RwLock<Vec<Client>>,
    fatal: FatalReporter,
}

impl ClientMonitor {
    pub fn new(
        preferences: Arc<PreferenceStore>,
        device: Arc<dyn DeviceClient>,
        notifier: Arc<dyn Notifier>,
        ignore: Arc<IgnoreList>,
        storage: ClientStorage,
        fatal: FatalReporter,
    ) -> Self {
        Self {
            preferences,
            device,
            notifier,
            ignore,
            storage,
            clients: RwLock::new(Vec::new()),
            fatal,
        }
    }

    /// Seed the in-memory list from the last persisted poll
    pub async fn load_persisted(&self) -> StorageResult<usize> {
        let clients = self.storage.list().await?;
        let count = clients.len();
        *self.clients.write().unwrap_or_else(PoisonError::into_inner) = clients;
        info!("Loaded {} clients from the last poll", count);
        Ok(count)
    }

    /// Clients seen by the last successful poll
    pub fn clients(&self) -> Vec<Client> {
        self.clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn client(&self, mac: &str) -> Option<Client> {
        let mac = normalize_mac(mac);
        self.clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|c| normalize_mac(&c.mac) == mac)
            .cloned()
    }

    /// Run one poll and return the detected events
    pub async fn poll(&self) -> MonitorResult<Vec<ClientEvent>> {
        let url = self.required(keys::URL)?;
        let username = self.required(keys::USERNAME)?;
        let password = self.required(keys::PASSWORD)?;

        self.device.connect(&url, &username, &password).await?;
        let current = self.device.list_clients().await?;

        let events = diff_clients(&self.clients(), &current);
        for event in &events {
            match event {
                ClientEvent::Dropped(c) => info!("Client dropped {}", c.describe()),
                ClientEvent::WentOffline(c) => info!("Client offline {}", c.describe()),
                ClientEvent::New(c) => info!("New client {}", c.describe()),
                ClientEvent::CameOnline(c) => info!("Client online {}", c.describe()),
            }
        }

        self.notify(&events).await?;

        self.storage.replace_all(&current).await?;
        debug!("Poll complete with {} clients", current.len());
        *self.clients.write().unwrap_or_else(PoisonError::into_inner) = current;

        Ok(events)
    }

    fn required(&self, name: &str) -> MonitorResult<String> {
        self.preferences
            .get(name)?
            .ok_or_else(|| MonitorError::MissingPreference(name.to_string()))
    }

    /// Send failures are logged only
    async fn notify(&self, events: &[ClientEvent]) -> MonitorResult<()> {
        let pending: Vec<(&ClientEvent, String)> = events
            .iter()
            .filter(|e| !self.ignore.contains(&e.client().mac))
            .filter_map(|e| e.notification_message().map(|m| (e, m)))
            .collect();

        if pending.is_empty() {
            return Ok(());
        }

        let Some(to) = self.preferences.get(keys::NOTIFICATION_TO)? else {
            warn!("'{}' is not set, skipping {} notifications", keys::NOTIFICATION_TO, pending.len());
            return Ok(());
        };
        let snapshot = self.preferences.snapshot()?;

        for (event, message) in pending {
            if let Err(e) = self.notifier.send(&to, &message, &snapshot).await {
                warn!(mac = %event.client().mac, "Failed to send notification: {}", e);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ScheduledTask for ClientMonitor {
    async fn run(&self) {
        match self.poll().await {
            Ok(events) => debug!("Poll produced {} events", events.len()),
            Err(e) if e.is_fatal() => self.fatal.report(e),
            Err(e) => warn!("Poll ended early: {}", e),
        }
    }

    fn name(&self) -> &str {
        "client monitor"
    }
}
