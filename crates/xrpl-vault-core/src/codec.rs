//! Encrypted record codec
//!
//! Encrypts arbitrary serde values with AES-256-GCM under a key derived
//! from the caller's secret. Salt and IV are freshly random per call and
//! stored alongside the ciphertext; GCM authentication is the only gate
//! for "correct secret".

use crate::kdf::{derive_key, SALT_LEN};
use crate::{Error, Result};
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use rand::RngCore;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Nonce length for AES-GCM
pub const IV_LEN: usize = 12;

/// Transport-safe encrypted record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedBlob {
    /// AES-GCM ciphertext (includes the authentication tag)
    pub encrypted: Vec<u8>,
    /// Per-record nonce, never reused with the same key
    pub iv: [u8; IV_LEN],
    /// Per-record KDF salt; not secret, stored with the ciphertext
    pub salt: [u8; SALT_LEN],
    /// Encryption time, unix milliseconds
    pub timestamp: i64,
}

/// Encrypt a serializable value under a secret.
///
/// Generates fresh random salt and IV for every call.
pub fn encrypt<T: Serialize>(value: &T, secret: &str) -> Result<EncryptedBlob> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    let key = derive_key(secret, &salt)?;
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    let plaintext = serde_json::to_vec(value)?;
    let encrypted = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext.as_slice())
        .map_err(|e| Error::Encryption(e.to_string()))?;

    Ok(EncryptedBlob {
        encrypted,
        iv,
        salt,
        timestamp: chrono::Utc::now().timestamp_millis(),
    })
}

/// Decrypt a blob back into its original value.
///
/// Fails with [`Error::InvalidSecret`] when GCM authentication fails
/// (wrong secret or tampered data) or when the plaintext does not parse
/// as the expected structure.
pub fn decrypt<T: DeserializeOwned>(blob: &EncryptedBlob, secret: &str) -> Result<T> {
    let key = derive_key(secret, &blob.salt)?;
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    let plaintext = cipher
        .decrypt(Nonce::from_slice(&blob.iv), blob.encrypted.as_slice())
        .map_err(|_| Error::InvalidSecret)?;

    serde_json::from_slice(&plaintext).map_err(|_| Error::InvalidSecret)
}
