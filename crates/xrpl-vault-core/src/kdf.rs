//! Encryption key derivation
//!
//! Turns a low-entropy secret (six-digit PIN or passkey-bound token) into
//! a 256-bit AES-GCM key via PBKDF2-HMAC-SHA256 with a per-record salt.
//! Short numeric PINs get a higher iteration count to compensate for
//! their low entropy.

use crate::{Error, Result};
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroizing;

/// Namespacing prefix mixed into every secret before derivation.
/// Defends against cross-application key reuse if the same PIN is used elsewhere.
pub const KEY_NAMESPACE: &str = "xrplto-wallet-v1:";

/// Required salt length in bytes
pub const SALT_LEN: usize = 16;

/// Iteration count for short numeric PINs
pub const PIN_ITERATIONS: u32 = 500_000;

/// Iteration count for longer secrets (passkey tokens, passphrase entropy)
pub const STANDARD_ITERATIONS: u32 = 100_000;

/// Derived symmetric key, zeroized on drop
pub struct DerivedKey(Zeroizing<[u8; 32]>);

impl DerivedKey {
    /// Get key bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

fn is_short_numeric(secret: &str) -> bool {
    secret.len() <= 8 && !secret.is_empty() && secret.chars().all(|c| c.is_ascii_digit())
}

/// Iteration count the derivation will use for a given secret
pub fn iterations_for(secret: &str) -> u32 {
    if is_short_numeric(secret) {
        PIN_ITERATIONS
    } else {
        STANDARD_ITERATIONS
    }
}

/// Derive a 256-bit key from a secret and a 16-byte salt.
///
/// Deterministic: the salt is persisted alongside the ciphertext and
/// reused for decryption, so the same (secret, salt) pair must always
/// yield the same key.
pub fn derive_key(secret: &str, salt: &[u8]) -> Result<DerivedKey> {
    if salt.len() != SALT_LEN {
        return Err(Error::KeyDerivation(format!(
            "Salt must be {} bytes, got {}",
            SALT_LEN,
            salt.len()
        )));
    }

    let namespaced = Zeroizing::new(format!("{}{}", KEY_NAMESPACE, secret));

    let mut key = Zeroizing::new([0u8; 32]);
    pbkdf2_hmac::<Sha256>(
        namespaced.as_bytes(),
        salt,
        iterations_for(secret),
        &mut *key,
    );

    Ok(DerivedKey(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SALT: [u8; 16] = [7u8; 16];

    #[test]
    fn test_derivation_is_deterministic() {
        let k1 = derive_key("284719", &SALT).unwrap();
        let k2 = derive_key("284719", &SALT).unwrap();
        assert_eq!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_different_secrets_differ() {
        let k1 = derive_key("284719", &SALT).unwrap();
        let k2 = derive_key("284718", &SALT).unwrap();
        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_different_salts_differ() {
        let k1 = derive_key("284719", &SALT).unwrap();
        let k2 = derive_key("284719", &[8u8; 16]).unwrap();
        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_malformed_salt_rejected() {
        assert!(derive_key("284719", &[0u8; 15]).is_err());
        assert!(derive_key("284719", &[0u8; 32]).is_err());
        assert!(derive_key("284719", &[]).is_err());
    }

    #[test]
    fn test_pin_gets_higher_work_factor() {
        assert_eq!(iterations_for("284719"), PIN_ITERATIONS);
        assert_eq!(iterations_for("12345678"), PIN_ITERATIONS);
        assert_eq!(iterations_for("123456789"), STANDARD_ITERATIONS);
        assert_eq!(iterations_for("passkey-bound-token"), STANDARD_ITERATIONS);
        assert_eq!(iterations_for(""), STANDARD_ITERATIONS);
    }
}
