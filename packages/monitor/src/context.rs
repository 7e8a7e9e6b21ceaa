// ABOUTME: Application context wiring every component together
// ABOUTME: Boot sequence from database to a running background poll

use clientwatch_config::{keys, Config, DEFAULT_PREFERENCES};
use clientwatch_device::{DeviceClient, DeviceKind};
use clientwatch_notifications::{Notifier, NotifierKind};
use clientwatch_preferences::PreferenceStore;
use clientwatch_scheduler::Scheduler;
use clientwatch_security::SecureValueCodec;
use clientwatch_storage::Database;
use std::sync::Arc;
use tracing::info;

use crate::fatal::{fatal_channel, FatalReceiver, FatalReporter};
use crate::ignore::IgnoreList;
use crate::poll::ClientMonitor;
use crate::restart::{register_restart_on_change, PollIntervalSource};
use crate::{MonitorError, MonitorResult};

/// Replace the drivers normally chosen by the `router` and `notification` preferences
#[derive(Default)]
pub struct DriverOverrides {
    pub device: Option<Arc<dyn DeviceClient>>,
    pub notifier: Option<Arc<dyn Notifier>>,
}

pub struct AppContext {
    database: Database,
    preferences: Arc<PreferenceStore>,
    scheduler: Arc<Scheduler>,
    monitor: Arc<ClientMonitor>,
    ignore: Arc<IgnoreList>,
    fatal: FatalReporter,
}

impl AppContext {
    /// Open the configured database and start polling
    pub async fn bootstrap(config: &Config) -> MonitorResult<(Self, FatalReceiver)> {
        let database = Database::open(&config.database_path).await?;
        Self::bootstrap_with(database, &config.passphrase, DriverOverrides::default()).await
    }

    pub async fn bootstrap_with(
        database: Database,
        passphrase: &str,
        overrides: DriverOverrides,
    ) -> MonitorResult<(Self, FatalReceiver)> {
        let (fatal, fatal_rx) = fatal_channel();

        let preferences = Arc::new(
            PreferenceStore::open(
                SecureValueCodec::new(passphrase),
                Arc::new(database.preferences()),
            )
            .await?,
        );
        seed_defaults(&preferences).await?;

        let device = match overrides.device {
            Some(device) => device,
            None => device_from_preferences(&preferences)?,
        };
        let notifier = match overrides.notifier {
            Some(notifier) => notifier,
            None => notifier_from_preferences(&preferences)?,
        };

        let ignore = Arc::new(IgnoreList::load(database.ignored_macs()).await?);
        let monitor = Arc::new(ClientMonitor::new(
            preferences.clone(),
            device,
            notifier,
            ignore.clone(),
            database.clients(),
            fatal.clone(),
        ));
        monitor.load_persisted().await?;

        let scheduler = Arc::new(Scheduler::new(Arc::new(PollIntervalSource::new(
            preferences.clone(),
        ))));
        scheduler.start(monitor.clone()).await?;
        register_restart_on_change(&preferences, keys::POLL_TIME, &scheduler, fatal.clone());

        info!("Client Watch started using {}", database.location());

        Ok((
            Self {
                database,
                preferences,
                scheduler,
                monitor,
                ignore,
                fatal,
            },
            fatal_rx,
        ))
    }

    pub fn preferences(&self) -> &Arc<PreferenceStore> {
        &self.preferences
    }

    pub fn scheduler(&self) -> &Arc<Scheduler> {
        &self.scheduler
    }

    pub fn monitor(&self) -> &Arc<ClientMonitor> {
        &self.monitor
    }

    pub fn ignore_list(&self) -> &Arc<IgnoreList> {
        &self.ignore
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn fatal_reporter(&self) -> FatalReporter {
        self.fatal.clone()
    }

    /// Stop polling, wait for the current tick, then close the database
    pub async fn shutdown(&self) {
        self.scheduler.shutdown().await;
        self.database.close().await;
        info!("Client Watch stopped");
    }
}

/// Seed boot defaults without overriding operator values
pub async fn seed_defaults(preferences: &PreferenceStore) -> MonitorResult<usize> {
    let mut seeded = 0;
    for default in DEFAULT_PREFERENCES {
        if preferences
            .set_default_preference(default.name, default.value, default.secure)
            .await?
        {
            seeded += 1;
        }
    }
    if seeded > 0 {
        info!("Seeded {} default preferences", seeded);
    }
    Ok(seeded)
}

fn device_from_preferences(preferences: &PreferenceStore) -> MonitorResult<Arc<dyn DeviceClient>> {
    let kind: DeviceKind = preferences
        .get(keys::ROUTER)?
        .ok_or_else(|| MonitorError::MissingPreference(keys::ROUTER.to_string()))?
        .parse()?;
    info!("Using '{}' device driver", kind);
    Ok(kind.build()?)
}

fn notifier_from_preferences(preferences: &PreferenceStore) -> MonitorResult<Arc<dyn Notifier>> {
    let kind: NotifierKind = preferences
        .get(keys::NOTIFICATION)?
        .ok_or_else(|| MonitorError::MissingPreference(keys::NOTIFICATION.to_string()))?
        .parse()?;
    info!("Using '{}' notification driver", kind);
    Ok(kind.build())
}
