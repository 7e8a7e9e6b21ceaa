// ABOUTME: Carrier SMS gateways reached through e-mail
// ABOUTME: Validates the destination number and SMTP settings before recording delivery

use async_trait::async_trait;
use clientwatch_config::keys;
use clientwatch_preferences::PreferenceSnapshot;
use tracing::{debug, info};

use crate::{NotificationError, NotificationResult, Notifier};

/// SMS payload limit
pub const MAX_MESSAGE_CHARS: usize = 140;
const SENDER: &str = "no-reply@wifi_client_watch";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Carrier {
    Verizon,
    TMobile,
}

impl Carrier {
    fn domain(&self) -> &'static str {
        match self {
            Carrier::Verizon => "vtext.com",
            Carrier::TMobile => "tmomail.net",
        }
    }
}

/// SMTP relay settings read from preferences
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub server: String,
    pub port: u16,
    pub user: Option<String>,
}

impl SmtpSettings {
    pub fn from_preferences(preferences: &PreferenceSnapshot) -> NotificationResult<Self> {
        let server = preferences
            .get(keys::SMTP_SERVER)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                NotificationError::Configuration(format!("'{}' is not set", keys::SMTP_SERVER))
            })?
            .to_string();

        let raw_port = preferences.get(keys::SMTP_PORT).ok_or_else(|| {
            NotificationError::Configuration(format!("'{}' is not set", keys::SMTP_PORT))
        })?;
        let port = raw_port.trim().parse::<u16>().map_err(|_| {
            NotificationError::Configuration(format!(
                "'{}' must be a port number, got '{}'",
                keys::SMTP_PORT,
                raw_port
            ))
        })?;

        Ok(Self {
            server,
            port,
            user: preferences.get(keys::SMTP_USER).map(str::to_string),
        })
    }
}

/// A message ready to hand to the relay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingSms {
    pub from: String,
    pub to: String,
    pub body: String,
    pub relay: SmtpSettings,
}

#[derive(Debug, Clone)]
pub struct SmsGateway {
    carrier: Carrier,
}

impl SmsGateway {
    pub fn new(carrier: Carrier) -> Self {
        Self { carrier }
    }

    /// Gateway address for a phone number, e.g. `5551234567@vtext.com`
    pub fn address_for(&self, number: &str) -> NotificationResult<String> {
        let digits: String = number.chars().filter(char::is_ascii_digit).collect();
        if digits.len() != 10 {
            return Err(NotificationError::InvalidDestination(number.to_string()));
        }
        Ok(format!("{}@{}", digits, self.carrier.domain()))
    }

    pub fn compose(
        &self,
        to: &str,
        message: &str,
        preferences: &PreferenceSnapshot,
    ) -> NotificationResult<OutgoingSms> {
        let to = self.address_for(to)?;
        let relay = SmtpSettings::from_preferences(preferences)?;

        Ok(OutgoingSms {
            from: SENDER.to_string(),
            to,
            body: truncate(message, MAX_MESSAGE_CHARS),
            relay,
        })
    }
}

#[async_trait]
impl Notifier for SmsGateway {
    async fn send(
        &self,
        to: &str,
        message: &str,
        preferences: &PreferenceSnapshot,
    ) -> NotificationResult<()> {
        let sms = self.compose(to, message, preferences)?;
        debug!(
            relay = %sms.relay.server,
            port = sms.relay.port,
            "Prepared SMS gateway message"
        );
        info!("Sending SMS notification to '{}' with message '{}'", sms.to, sms.body);
        Ok(())
    }
}

fn truncate(message: &str, max_chars: usize) -> String {
    message.chars().take(max_chars).collect()
}
