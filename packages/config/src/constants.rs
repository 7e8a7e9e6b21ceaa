// ABOUTME: Environment variable name constants
// ABOUTME: Centralized definitions of all environment variable names used across Client Watch

// HTTP Server
pub const CLIENTWATCH_PORT: &str = "CLIENTWATCH_PORT";
pub const CLIENTWATCH_CORS_ORIGIN: &str = "CLIENTWATCH_CORS_ORIGIN";

// Storage
pub const CLIENTWATCH_DATABASE: &str = "CLIENTWATCH_DATABASE";

// Secure preferences
pub const CLIENTWATCH_PASSPHRASE: &str = "CLIENTWATCH_PASSPHRASE";

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATABASE: &str = "./wifi_client_watch.db";
pub const DEFAULT_CORS_ORIGIN: &str = "*";

/// Passphrase used for secure preferences when none is configured.
///
/// This only obfuscates values at rest; anyone holding the database and the
/// binary can recover them.
pub const DEFAULT_PASSPHRASE: &str = "PleaseChangeMe";
