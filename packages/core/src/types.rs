// ABOUTME: Shared type definitions
// ABOUTME: Network client as reported by the device and persisted by storage

use serde::{Deserialize, Serialize};

/// A client attached to the polled device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub name: String,
    pub mac: String,
    pub ip: String,
    pub vendor: String,
    pub online: bool,
}

impl Client {
    /// Short description used in logs and notifications
    pub fn describe(&self) -> String {
        format!("{} (MAC={}, IP={})", self.name, self.mac, self.ip)
    }
}
