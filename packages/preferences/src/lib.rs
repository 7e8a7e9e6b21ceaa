// ABOUTME: Preference store for Client Watch
// ABOUTME: Name/value configuration with encryption at rest and per-name change watchers

pub mod error;
pub mod store;
pub mod types;

pub use error::PreferenceError;
pub use store::{PreferenceStore, Watcher};
pub use types::{PreferenceSnapshot, PreferenceView, SECRET_MASK};
