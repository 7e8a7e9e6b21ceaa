// ABOUTME: Error type for monitoring and application wiring
// ABOUTME: Separates transient poll failures from conditions that must stop the process

use clientwatch_device::DeviceError;
use clientwatch_notifications::NotificationError;
use clientwatch_preferences::PreferenceError;
use clientwatch_scheduler::SchedulerError;
use clientwatch_storage::StorageError;
use thiserror::Error;

pub type MonitorResult<T> = Result<T, MonitorError>;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Preference '{0}' is not set")]
    MissingPreference(String),

    #[error(transparent)]
    Preference(#[from] PreferenceError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),
}

impl MonitorError {
    /// Whether the process should stop rather than wait for the next tick
    pub fn is_fatal(&self) -> bool {
        match self {
            MonitorError::MissingPreference(_) => false,
            MonitorError::Preference(e) => e.is_fatal(),
            MonitorError::Storage(_) => true,
            MonitorError::Scheduler(_) => true,
            MonitorError::Device(_) => false,
            MonitorError::Notification(_) => false,
        }
    }
}
