//! Saved withdrawal destinations
//!
//! Per-user payout addresses, encrypted under the device key (these are
//! labels, not spendable secrets, so PIN gating is intentionally not
//! applied). The owning `user_address` stays plaintext as the filter
//! column; a corrupted record is skipped with a warning rather than
//! failing the whole list.

use crate::error::{Error, Result};
use rusqlite::{params, Connection, OptionalExtension};
use xrpl_vault_core::{
    codec, DeviceKeyProvider, EncryptedBlob, WithdrawalAddress, WithdrawalAddressBody,
};

/// Maximum name length
pub const MAX_NAME_LENGTH: usize = 100;

/// Partial update for a stored withdrawal address
#[derive(Debug, Default, Clone)]
pub struct WithdrawalUpdate {
    /// New display name
    pub name: Option<String>,
    /// New destination address
    pub address: Option<String>,
    /// New destination tag
    pub tag: Option<String>,
    /// Remove the destination tag (wins over `tag`)
    pub clear_tag: bool,
}

/// Withdrawal address storage
pub struct WithdrawalAddressStore;

impl WithdrawalAddressStore {
    /// Encrypt and append a new destination for a user
    pub fn add(
        conn: &Connection,
        device: &dyn DeviceKeyProvider,
        user_address: &str,
        name: &str,
        address: &str,
        tag: Option<&str>,
    ) -> Result<WithdrawalAddress> {
        if user_address.is_empty() {
            return Err(Error::Validation("User address cannot be empty".to_string()));
        }
        if name.is_empty() {
            return Err(Error::Validation("Name cannot be empty".to_string()));
        }
        if name.len() > MAX_NAME_LENGTH {
            return Err(Error::Validation(format!(
                "Name too long: {} (max {})",
                name.len(),
                MAX_NAME_LENGTH
            )));
        }
        if address.is_empty() {
            return Err(Error::Validation("Address cannot be empty".to_string()));
        }

        let body = WithdrawalAddressBody {
            name: name.to_string(),
            address: address.to_string(),
            tag: tag.map(str::to_string),
            created_at: chrono::Utc::now().timestamp_millis(),
            updated_at: None,
        };

        let blob = codec::encrypt(&body, &device.device_secret())?;
        conn.execute(
            "INSERT INTO withdrawals (user_address, data, timestamp) VALUES (?1, ?2, ?3)",
            params![user_address, serde_json::to_string(&blob)?, blob.timestamp],
        )?;

        Ok(body.into_record(conn.last_insert_rowid(), user_address.to_string()))
    }

    /// Decrypt and list every destination saved by a user.
    ///
    /// Rows that fail to decode are skipped with a warning; the rest
    /// are still returned.
    pub fn get_all(
        conn: &Connection,
        device: &dyn DeviceKeyProvider,
        user_address: &str,
    ) -> Result<Vec<WithdrawalAddress>> {
        let mut stmt = conn.prepare(
            "SELECT id, data FROM withdrawals WHERE user_address = ?1 ORDER BY id ASC",
        )?;

        let rows = stmt
            .query_map(params![user_address], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut out = Vec::with_capacity(rows.len());
        for (id, text) in rows {
            match Self::decode_row(device, &text) {
                Ok(body) => out.push(body.into_record(id, user_address.to_string())),
                Err(e) => {
                    tracing::warn!("Skipping unreadable withdrawal record {id}: {e}");
                }
            }
        }

        Ok(out)
    }

    /// Decrypt, merge the partial fields, re-encrypt, and store.
    pub fn update(
        conn: &Connection,
        device: &dyn DeviceKeyProvider,
        id: i64,
        update: WithdrawalUpdate,
    ) -> Result<WithdrawalAddress> {
        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT user_address, data FROM withdrawals WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let (user_address, text) =
            row.ok_or_else(|| Error::NotFound(format!("Withdrawal address {id} not found")))?;

        let mut body = Self::decode_row(device, &text)?;
        if let Some(name) = update.name {
            if name.is_empty() || name.len() > MAX_NAME_LENGTH {
                return Err(Error::Validation("Invalid name".to_string()));
            }
            body.name = name;
        }
        if let Some(address) = update.address {
            if address.is_empty() {
                return Err(Error::Validation("Address cannot be empty".to_string()));
            }
            body.address = address;
        }
        if update.clear_tag {
            body.tag = None;
        } else if let Some(tag) = update.tag {
            body.tag = Some(tag);
        }
        body.updated_at = Some(chrono::Utc::now().timestamp_millis());

        let blob = codec::encrypt(&body, &device.device_secret())?;
        conn.execute(
            "UPDATE withdrawals SET data = ?1, timestamp = ?2 WHERE id = ?3",
            params![serde_json::to_string(&blob)?, blob.timestamp, id],
        )?;

        Ok(body.into_record(id, user_address))
    }

    /// Delete one destination by id
    pub fn remove(conn: &Connection, id: i64) -> Result<()> {
        let rows = conn.execute("DELETE FROM withdrawals WHERE id = ?1", params![id])?;
        if rows == 0 {
            return Err(Error::NotFound(format!("Withdrawal address {id} not found")));
        }
        Ok(())
    }

    /// Check whether a user already saved a destination address.
    ///
    /// Addresses live inside the encrypted bodies, so this decrypts and
    /// compares; unreadable rows are ignored.
    pub fn exists(
        conn: &Connection,
        device: &dyn DeviceKeyProvider,
        user_address: &str,
        address: &str,
    ) -> Result<bool> {
        Ok(Self::get_all(conn, device, user_address)?
            .iter()
            .any(|record| record.address == address))
    }

    /// Delete every destination saved by a user; returns the count removed
    pub fn clear_all(conn: &Connection, user_address: &str) -> Result<usize> {
        let rows = conn.execute(
            "DELETE FROM withdrawals WHERE user_address = ?1",
            params![user_address],
        )?;
        Ok(rows)
    }

    fn decode_row(device: &dyn DeviceKeyProvider, text: &str) -> Result<WithdrawalAddressBody> {
        let blob: EncryptedBlob = serde_json::from_str(text)?;
        Ok(codec::decrypt(&blob, &device.device_secret())?)
    }
}
