// ABOUTME: Encryption of secure preference values for Client Watch
// ABOUTME: Passphrase-derived AES-GCM codec with printable (base64) storage encoding

pub mod encryption;

// Re-export main types for convenience
pub use encryption::{EncryptionError, SecureValueCodec};
