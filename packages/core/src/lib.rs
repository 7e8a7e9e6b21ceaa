// ABOUTME: Core types and utilities for Client Watch
// ABOUTME: Shared client record and MAC address helpers used by every package

pub mod types;
pub mod utils;

pub use types::Client;
pub use utils::normalize_mac;
