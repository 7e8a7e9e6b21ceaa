// ABOUTME: Process configuration loaded from the environment
// ABOUTME: Port, database location, CORS origin and secure preference passphrase

use crate::constants::*;
use std::env;
use std::num::ParseIntError;
use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid port number: {0}")]
    InvalidPort(#[from] ParseIntError),
    #[error("Port {0} is out of valid range (1-65535)")]
    PortOutOfRange(u16),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: PathBuf,
    pub cors_origin: String,
    pub passphrase: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_path: PathBuf::from(DEFAULT_DATABASE),
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
            passphrase: DEFAULT_PASSPHRASE.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from `.env` (if present) and the process environment
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match env::var(CLIENTWATCH_PORT) {
            Ok(raw) => raw.trim().parse::<u16>()?,
            Err(_) => DEFAULT_PORT,
        };

        if port == 0 {
            return Err(ConfigError::PortOutOfRange(port));
        }

        let database_path = env::var(CLIENTWATCH_DATABASE)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATABASE));

        let cors_origin =
            env::var(CLIENTWATCH_CORS_ORIGIN).unwrap_or_else(|_| DEFAULT_CORS_ORIGIN.to_string());

        let passphrase = match env::var(CLIENTWATCH_PASSPHRASE) {
            Ok(value) if !value.is_empty() => value,
            _ => {
                warn!(
                    "{} not set, secure preferences use the built-in passphrase",
                    CLIENTWATCH_PASSPHRASE
                );
                DEFAULT_PASSPHRASE.to_string()
            }
        };

        Ok(Config {
            port,
            database_path,
            cors_origin,
            passphrase,
        })
    }

    pub fn with_port(mut self, port: Option<u16>) -> Self {
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    pub fn with_database_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.database_path = path;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            CLIENTWATCH_PORT,
            CLIENTWATCH_DATABASE,
            CLIENTWATCH_CORS_ORIGIN,
            CLIENTWATCH_PASSPHRASE,
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_when_env_empty() {
        clear_env();
        let config = Config::from_env().unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.database_path, PathBuf::from(DEFAULT_DATABASE));
        assert_eq!(config.cors_origin, "*");
        assert_eq!(config.passphrase, DEFAULT_PASSPHRASE);
    }

    #[test]
    #[serial]
    fn test_reads_env_values() {
        clear_env();
        env::set_var(CLIENTWATCH_PORT, "9090");
        env::set_var(CLIENTWATCH_DATABASE, "/tmp/watch.db");
        env::set_var(CLIENTWATCH_PASSPHRASE, "hunter2");

        let config = Config::from_env().unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.database_path, PathBuf::from("/tmp/watch.db"));
        assert_eq!(config.passphrase, "hunter2");
        clear_env();
    }

    #[test]
    #[serial]
    fn test_rejects_invalid_port() {
        clear_env();
        env::set_var(CLIENTWATCH_PORT, "not-a-port");
        assert!(matches!(Config::from_env(), Err(ConfigError::InvalidPort(_))));

        env::set_var(CLIENTWATCH_PORT, "0");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::PortOutOfRange(0))
        ));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_empty_passphrase_falls_back_to_default() {
        clear_env();
        env::set_var(CLIENTWATCH_PASSPHRASE, "");
        let config = Config::from_env().unwrap();
        assert_eq!(config.passphrase, DEFAULT_PASSPHRASE);
        clear_env();
    }

    #[test]
    fn test_cli_overrides() {
        let config = Config::default()
            .with_port(Some(1234))
            .with_database_path(Some(PathBuf::from("other.db")))
            .with_port(None);
        assert_eq!(config.port, 1234);
        assert_eq!(config.database_path, PathBuf::from("other.db"));
    }
}
