// ABOUTME: Error types for the preference store
// ABOUTME: Integrity and persistence failures are fatal to callers that depend on configuration

use clientwatch_security::EncryptionError;
use clientwatch_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreferenceError {
    /// A secure value could not be decoded or authenticated
    #[error("Secure preference '{name}' failed integrity check")]
    Integrity {
        name: String,
        #[source]
        source: EncryptionError,
    },

    #[error("Failed to encrypt preference '{name}'")]
    Encryption {
        name: String,
        #[source]
        source: EncryptionError,
    },

    #[error("Failed to persist preference '{name}'")]
    Persistence {
        name: String,
        #[source]
        source: StorageError,
    },

    #[error("Failed to load preferences from backing store")]
    Load(#[source] StorageError),

    #[error("Backing store has already been set")]
    BackingStoreAlreadySet,
}

impl PreferenceError {
    /// Errors after which the process can no longer trust its configuration
    pub fn is_fatal(&self) -> bool {
        !matches!(self, PreferenceError::BackingStoreAlreadySet)
    }
}
