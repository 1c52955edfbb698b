//! SQLite storage for the XRPL wallet vault
//!
//! Persists the client-side wallet state: the encrypted wallet bundle,
//! plaintext profiles, device-sealed unlock credentials, and saved
//! withdrawal destinations. One database file per device, WAL mode,
//! versioned migrations.
//!
//! ## Layout
//!
//! - **Wallet vault**: a single encrypted row holding every wallet
//!   record, openable only with the user's PIN or OAuth-derived secret
//! - **Profiles**: public account metadata, readable without any secret
//! - **Credentials**: unlock secrets sealed under the device key so a
//!   trusted device can skip the PIN prompt
//! - **Withdrawals**: per-user payout addresses, device-key encrypted

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod credential_vault;
pub mod database;
pub mod error;
pub mod migrations;
pub mod notify;
pub mod profile_store;
pub mod wallet_vault;
pub mod withdrawal_store;

pub use credential_vault::CredentialVault;
pub use database::{Database, DB_FILE_NAME};
pub use error::{Error, Result};
pub use migrations::SCHEMA_VERSION;
pub use notify::{clear_listeners, emit, subscribe, StoreEvent};
pub use profile_store::ProfileStore;
pub use wallet_vault::{WalletVault, MAIN_WALLET_ID};
pub use withdrawal_store::{WithdrawalAddressStore, WithdrawalUpdate, MAX_NAME_LENGTH};
