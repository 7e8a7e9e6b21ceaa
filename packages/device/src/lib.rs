// ABOUTME: Device drivers for polling connected clients
// ABOUTME: A small async trait plus the ASUSWRT HTTP driver and a kind registry

pub mod asuswrt;
pub mod error;
pub mod kind;

use async_trait::async_trait;

pub use asuswrt::AsusWrtClient;
pub use clientwatch_core::Client;
pub use error::{DeviceError, DeviceResult};
pub use kind::DeviceKind;

/// Anything that can report the clients attached to a network device
#[async_trait]
pub trait DeviceClient: Send + Sync {
    /// Establish or reuse a session with the device
    async fn connect(&self, endpoint: &str, username: &str, password: &str) -> DeviceResult<()>;

    /// Clients known to the device, online or not
    async fn list_clients(&self) -> DeviceResult<Vec<Client>>;
}
