// ABOUTME: Notification senders for Client Watch
// ABOUTME: Async sender trait, SMS e-mail gateways and the kind registry

pub mod error;
pub mod kind;
pub mod sms;

use async_trait::async_trait;
use clientwatch_preferences::PreferenceSnapshot;

pub use error::{NotificationError, NotificationResult};
pub use kind::NotifierKind;
pub use sms::{Carrier, OutgoingSms, SmsGateway, SmtpSettings};

/// Delivers a short text message to a destination
#[async_trait]
pub trait Notifier: Send + Sync {
    /// `preferences` carries transport settings such as SMTP credentials
    async fn send(
        &self,
        to: &str,
        message: &str,
        preferences: &PreferenceSnapshot,
    ) -> NotificationResult<()>;
}
