//! Cached unlock credentials
//!
//! Maps a device/passkey identifier to a device-sealed copy of the
//! user's unlock secret, so a trusted device can re-unlock without
//! re-prompting. This store is a convenience cache only: the wallet
//! vault's own encryption stays the source of truth, and any failure
//! here degrades to manual PIN entry.

use crate::error::Result;
use crate::notify::{emit, StoreEvent};
use rusqlite::{params, Connection, OptionalExtension};
use xrpl_vault_core::{codec, DeviceKeyProvider, EncryptedBlob};

/// Credential vault storage
pub struct CredentialVault;

impl CredentialVault {
    /// Seal the unlock secret under the device key and store it for the
    /// given passkey id, replacing any previous entry.
    pub fn store_wallet_credential(
        conn: &Connection,
        device: &dyn DeviceKeyProvider,
        passkey_id: &str,
        secret: &str,
    ) -> Result<()> {
        let blob = codec::encrypt(&secret.to_string(), &device.device_secret())?;
        conn.execute(
            "INSERT OR REPLACE INTO wallet_credentials (passkey_id, blob, timestamp) \
             VALUES (?1, ?2, ?3)",
            params![passkey_id, serde_json::to_string(&blob)?, blob.timestamp],
        )?;
        Ok(())
    }

    /// Recover the unlock secret for a passkey id.
    ///
    /// Returns `None` on a missing row or any decryption failure; the
    /// caller falls back to manual PIN entry, never treats this as fatal.
    pub fn get_wallet_credential(
        conn: &Connection,
        device: &dyn DeviceKeyProvider,
        passkey_id: &str,
    ) -> Result<Option<String>> {
        let text: Option<String> = conn
            .query_row(
                "SELECT blob FROM wallet_credentials WHERE passkey_id = ?1",
                params![passkey_id],
                |row| row.get(0),
            )
            .optional()?;

        let Some(text) = text else {
            return Ok(None);
        };

        let blob: EncryptedBlob = match serde_json::from_str(&text) {
            Ok(blob) => blob,
            Err(e) => {
                tracing::warn!("Stored credential for {passkey_id} is malformed: {e}");
                return Ok(None);
            }
        };

        match codec::decrypt::<String>(&blob, &device.device_secret()) {
            Ok(secret) => Ok(Some(secret)),
            Err(e) => {
                tracing::warn!("Could not open stored credential for {passkey_id}: {e}");
                Ok(None)
            }
        }
    }

    /// Wipe the entire store (global logout)
    pub fn clear_wallet_credentials(conn: &Connection) -> Result<()> {
        conn.execute("DELETE FROM wallet_credentials", [])?;
        emit(StoreEvent::CredentialsCleared);
        Ok(())
    }
}
