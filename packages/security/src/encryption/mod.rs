// ABOUTME: Secure preference value encryption using AES-128-GCM AEAD
// ABOUTME: Key is derived from a passphrase with a fast hash; output is base64(nonce || ciphertext || tag)
//
// SECURITY MODEL:
//
// The key is a truncated SHA-256 of the configured passphrase. There is no salt
// and no work factor, so a weak passphrase falls to an offline search by anyone
// holding the database. This keeps credentials out of plain sight in the
// preference table; it is not an at-rest protection boundary.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use ring::{
    aead::{self, Nonce, UnboundKey},
    error::Unspecified,
    rand::{SecureRandom, SystemRandom},
};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;

/// Key size for AES-128-GCM
pub const KEY_SIZE: usize = 16;

/// Nonce size for AES-GCM
pub const NONCE_SIZE: usize = 12;

#[derive(Debug, thiserror::Error)]
pub enum EncryptionError {
    #[error("Failed to generate random data: {0}")]
    RandomGeneration(String),

    #[error("Failed to encrypt data: {0}")]
    Encryption(String),

    /// The authentication tag did not verify: tampered data or wrong passphrase
    #[error("Secure value failed integrity check")]
    Integrity,

    #[error("Invalid encrypted data format")]
    InvalidFormat,
}

impl From<Unspecified> for EncryptionError {
    fn from(_: Unspecified) -> Self {
        EncryptionError::Encryption("Cryptographic operation failed".to_string())
    }
}

/// Symmetric codec for secure preference values
#[derive(Clone)]
pub struct SecureValueCodec {
    rng: Arc<SystemRandom>,
    key: [u8; KEY_SIZE],
}

impl fmt::Debug for SecureValueCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureValueCodec").finish_non_exhaustive()
    }
}

impl SecureValueCodec {
    /// Create a codec whose key is derived from `passphrase`
    pub fn new(passphrase: &str) -> Self {
        Self {
            rng: Arc::new(SystemRandom::new()),
            key: derive_key(passphrase),
        }
    }

    /// Encrypt raw bytes. Returns nonce || ciphertext || tag
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, EncryptionError> {
        // Generate random nonce
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        self.rng.fill(&mut nonce_bytes).map_err(|_| {
            EncryptionError::RandomGeneration("Failed to generate nonce".to_string())
        })?;

        let nonce = Nonce::assume_unique_for_key(nonce_bytes);

        let unbound_key = UnboundKey::new(&aead::AES_128_GCM, &self.key)?;
        let sealing_key = aead::LessSafeKey::new(unbound_key);

        let mut in_out = plaintext.to_vec();
        sealing_key
            .seal_in_place_append_tag(nonce, aead::Aad::empty(), &mut in_out)
            .map_err(|_| EncryptionError::Encryption("Seal operation failed".to_string()))?;

        let mut result = Vec::with_capacity(NONCE_SIZE + in_out.len());
        result.extend_from_slice(&nonce_bytes);
        result.extend_from_slice(&in_out);

        Ok(result)
    }

    /// Decrypt bytes produced by [`encrypt`](Self::encrypt)
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, EncryptionError> {
        if data.len() < NONCE_SIZE {
            return Err(EncryptionError::InvalidFormat);
        }

        let (nonce_bytes, ciphertext_and_tag) = data.split_at(NONCE_SIZE);
        if ciphertext_and_tag.len() < aead::AES_128_GCM.tag_len() {
            return Err(EncryptionError::Integrity);
        }
        let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
            .map_err(|_| EncryptionError::InvalidFormat)?;

        let unbound_key = UnboundKey::new(&aead::AES_128_GCM, &self.key)?;
        let opening_key = aead::LessSafeKey::new(unbound_key);

        let mut in_out = ciphertext_and_tag.to_vec();
        let plaintext = opening_key
            .open_in_place(nonce, aead::Aad::empty(), &mut in_out)
            .map_err(|_| EncryptionError::Integrity)?;

        Ok(plaintext.to_vec())
    }

    /// Encrypt a string for storage: base64(nonce || ciphertext || tag)
    pub fn encrypt_to_string(&self, plaintext: &str) -> Result<String, EncryptionError> {
        Ok(BASE64.encode(self.encrypt(plaintext.as_bytes())?))
    }

    /// Decode and decrypt a stored value
    pub fn decrypt_from_string(&self, encoded: &str) -> Result<String, EncryptionError> {
        let data = BASE64
            .decode(encoded)
            .map_err(|_| EncryptionError::InvalidFormat)?;
        let plaintext = self.decrypt(&data)?;

        // Non UTF-8 output can only come from a forged tag, so treat it the same way
        String::from_utf8(plaintext).map_err(|_| EncryptionError::Integrity)
    }
}

fn derive_key(passphrase: &str) -> [u8; KEY_SIZE] {
    let digest = Sha256::digest(passphrase.as_bytes());
    let mut key = [0u8; KEY_SIZE];
    key.copy_from_slice(&digest[..KEY_SIZE]);
    key
}
