// ABOUTME: Configuration and environment variable management for Client Watch
// ABOUTME: Process settings from the environment plus preference key names and defaults

pub mod config;
pub mod constants;
pub mod keys;

pub use config::{Config, ConfigError};
pub use keys::{DefaultPreference, DEFAULT_PREFERENCES};
