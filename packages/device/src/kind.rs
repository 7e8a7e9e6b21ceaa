// ABOUTME: Registry of supported device drivers
// ABOUTME: Maps the `router` preference value to a concrete driver

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::{AsusWrtClient, DeviceClient, DeviceError, DeviceResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    AsusWrt,
}

impl DeviceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::AsusWrt => "asuswrt",
        }
    }

    /// Construct a fresh driver for this kind
    pub fn build(&self) -> DeviceResult<Arc<dyn DeviceClient>> {
        match self {
            DeviceKind::AsusWrt => Ok(Arc::new(AsusWrtClient::new()?)),
        }
    }
}

impl FromStr for DeviceKind {
    type Err = DeviceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asuswrt" => Ok(DeviceKind::AsusWrt),
            other => Err(DeviceError::UnknownKind(other.to_string())),
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
