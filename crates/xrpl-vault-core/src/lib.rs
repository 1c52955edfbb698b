//! XRPL wallet vault core
//!
//! This crate implements the encryption primitives for the wallet vault:
//! PBKDF2 key derivation, the AES-GCM record codec, PIN policy, the
//! device-local key seam, and the XRPL keyring collaborator seam.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod codec;
pub mod device;
pub mod error;
pub mod kdf;
pub mod keyring;
pub mod models;
pub mod pin;

pub use codec::{decrypt, encrypt, EncryptedBlob};
pub use device::{DeviceKeyProvider, StaticDeviceKey};
pub use error::{Error, Result};
pub use kdf::{derive_key, DerivedKey, KEY_NAMESPACE, PIN_ITERATIONS, STANDARD_ITERATIONS, SALT_LEN};
pub use keyring::{Ed25519Keyring, XrplKeypair, XrplKeyring};
pub use models::{
    CredentialRecord, Profile, WalletBundle, WalletRecord, WalletType, WithdrawalAddress,
    WithdrawalAddressBody,
};
pub use pin::{is_valid as is_valid_pin, validate as validate_pin, PIN_LENGTH};
