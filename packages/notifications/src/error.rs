// ABOUTME: Notification error types
// ABOUTME: Send failures are logged by the caller and never stop polling

use thiserror::Error;

pub type NotificationResult<T> = Result<T, NotificationError>;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Invalid destination '{0}': expected a 10 digit phone number")]
    InvalidDestination(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unknown notification kind '{0}'")]
    UnknownKind(String),
}
