//! Error types for the vault core
//!
//! The taxonomy mirrors the failure semantics of the stores: a wrong
//! secret and tampered ciphertext are deliberately the same error.

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Vault core errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Wrong secret presented to decrypt, or ciphertext tampered.
    /// GCM gives no partial-success signal, so the two are indistinguishable.
    #[error("Invalid secret: decryption failed")]
    InvalidSecret,

    /// No wallet vault entry exists yet
    #[error("No wallet found")]
    NoWalletFound,

    /// Referenced record absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Input failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Key derivation error (malformed salt, bad parameters)
    #[error("Key derivation error: {0}")]
    KeyDerivation(String),

    /// Encryption error
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Invalid seed or key material
    #[error("Invalid seed: {0}")]
    InvalidSeed(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Storage error (generic)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Error::InvalidSecret => {
                "Incorrect PIN. Please try again.".to_string()
            }
            Error::NoWalletFound => {
                "No wallet exists on this device yet. Create one to continue.".to_string()
            }
            Error::Validation(_) => {
                "The value you entered is invalid. Please check and try again.".to_string()
            }
            Error::InvalidSeed(_) => {
                "The wallet seed is invalid. Please check and try again.".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Check if the error is recoverable by re-prompting the user
    pub fn is_reprompt(&self) -> bool {
        matches!(self, Error::InvalidSecret | Error::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        let msg = Error::InvalidSecret.user_message();
        assert!(msg.contains("Incorrect PIN"));

        let msg = Error::NoWalletFound.user_message();
        assert!(msg.contains("No wallet exists"));
    }

    #[test]
    fn test_reprompt_classification() {
        assert!(Error::InvalidSecret.is_reprompt());
        assert!(Error::Validation("bad".to_string()).is_reprompt());
        assert!(!Error::Storage("io".to_string()).is_reprompt());
        assert!(!Error::NoWalletFound.is_reprompt());
    }
}
