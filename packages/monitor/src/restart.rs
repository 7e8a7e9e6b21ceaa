// ABOUTME: Glue between the preference store and the scheduler
// ABOUTME: Reads the poll interval and restarts polling when it changes

use clientwatch_config::keys;
use clientwatch_preferences::PreferenceStore;
use clientwatch_scheduler::{IntervalSource, Scheduler, SchedulerError};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{error, info};

use crate::fatal::FatalReporter;
use crate::MonitorError;

/// Interval from the `poll_time` preference, in whole seconds
#[derive(Debug, Clone)]
pub struct PollIntervalSource {
    preferences: Arc<PreferenceStore>,
}

impl PollIntervalSource {
    pub fn new(preferences: Arc<PreferenceStore>) -> Self {
        Self { preferences }
    }
}

impl IntervalSource for PollIntervalSource {
    fn poll_interval(&self) -> Result<Duration, SchedulerError> {
        let raw = self
            .preferences
            .get(keys::POLL_TIME)
            .map_err(|e| SchedulerError::IntervalSource(e.to_string()))?
            .ok_or_else(|| SchedulerError::ConfigMissing(keys::POLL_TIME.to_string()))?;

        parse_seconds(&raw)
    }
}

fn parse_seconds(raw: &str) -> Result<Duration, SchedulerError> {
    let invalid = |reason: &str| SchedulerError::InvalidInterval {
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    let seconds: u64 = raw
        .trim()
        .parse()
        .map_err(|_| invalid("expected a whole number of seconds"))?;
    if seconds == 0 {
        return Err(invalid("interval must be positive"));
    }
    Ok(Duration::from_secs(seconds))
}

/// Restart `scheduler` whenever `key` is set.
///
/// The watcher holds the scheduler weakly so the store and scheduler can be
/// dropped together. A failed restart is reported as fatal.
pub fn register_restart_on_change(
    preferences: &PreferenceStore,
    key: &str,
    scheduler: &Arc<Scheduler>,
    fatal: FatalReporter,
) {
    let scheduler: Weak<Scheduler> = Arc::downgrade(scheduler);
    let key_name = key.to_string();

    preferences.add_watcher(key, move |_old, _new| {
        let scheduler = scheduler.clone();
        let fatal = fatal.clone();
        let key_name = key_name.clone();
        async move {
            let Some(scheduler) = scheduler.upgrade() else {
                return;
            };
            info!("Preference '{}' changed, restarting background task", key_name);
            if let Err(e) = scheduler.restart().await {
                error!("Background task restart failed: {}", e);
                fatal.report(MonitorError::Scheduler(e));
            }
        }
    });
}
