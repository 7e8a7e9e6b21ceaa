// ABOUTME: Error types for the background scheduler
// ABOUTME: A missing or unusable interval is fatal because there is no sensible fallback

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Required preference '{0}' is not set")]
    ConfigMissing(String),

    #[error("Invalid poll interval '{value}': {reason}")]
    InvalidInterval { value: String, reason: String },

    #[error("Failed to read poll interval: {0}")]
    IntervalSource(String),

    #[error("Scheduler already running (generation {0})")]
    AlreadyRunning(u64),

    #[error("Restart did not complete: {0}")]
    RestartAborted(String),
}
