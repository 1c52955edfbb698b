//! Error types

use xrpl_vault_core as core;

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Wrong secret presented to decrypt
    #[error("Invalid secret: decryption failed")]
    InvalidSecret,

    /// No wallet vault entry exists yet
    #[error("No wallet found")]
    NoWalletFound,

    /// A wallet vault entry already exists
    #[error("Wallet already exists on this device")]
    WalletAlreadyExists,

    /// Referenced record absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Input failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Encryption error
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Storage error (generic)
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<core::Error> for Error {
    fn from(err: core::Error) -> Self {
        match err {
            core::Error::InvalidSecret => Error::InvalidSecret,
            core::Error::NoWalletFound => Error::NoWalletFound,
            core::Error::NotFound(msg) => Error::NotFound(msg),
            core::Error::Validation(msg) => Error::Validation(msg),
            core::Error::KeyDerivation(msg) | core::Error::Encryption(msg) => {
                Error::Encryption(msg)
            }
            core::Error::Serialization(e) => Error::Serialization(e),
            core::Error::InvalidSeed(msg) => Error::Validation(msg),
            core::Error::Storage(msg) | core::Error::Other(msg) => Error::Storage(msg),
        }
    }
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
