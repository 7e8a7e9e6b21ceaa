// ABOUTME: Registry of supported notification senders
// ABOUTME: Maps the `notification` preference value to a concrete sender

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::sms::{Carrier, SmsGateway};
use crate::{NotificationError, Notifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifierKind {
    Verizon,
    TMobile,
}

impl NotifierKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotifierKind::Verizon => "verizon",
            NotifierKind::TMobile => "tmobile",
        }
    }

    pub fn build(&self) -> Arc<dyn Notifier> {
        match self {
            NotifierKind::Verizon => Arc::new(SmsGateway::new(Carrier::Verizon)),
            NotifierKind::TMobile => Arc::new(SmsGateway::new(Carrier::TMobile)),
        }
    }
}

impl FromStr for NotifierKind {
    type Err = NotificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "verizon" => Ok(NotifierKind::Verizon),
            "tmobile" | "t-mobile" => Ok(NotifierKind::TMobile),
            other => Err(NotificationError::UnknownKind(other.to_string())),
        }
    }
}

impl fmt::Display for NotifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind() {
        assert_eq!("verizon".parse::<NotifierKind>().unwrap(), NotifierKind::Verizon);
        assert_eq!("TMobile".parse::<NotifierKind>().unwrap(), NotifierKind::TMobile);
        assert_eq!("t-mobile".parse::<NotifierKind>().unwrap(), NotifierKind::TMobile);
    }

    #[test]
    fn test_unknown_kind() {
        assert!(matches!(
            "pager".parse::<NotifierKind>(),
            Err(NotificationError::UnknownKind(ref k)) if k == "pager"
        ));
    }

    #[test]
    fn test_display_round_trips() {
        for kind in [NotifierKind::Verizon, NotifierKind::TMobile] {
            assert_eq!(kind.to_string().parse::<NotifierKind>().unwrap(), kind);
        }
    }
}
