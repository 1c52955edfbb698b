//! Plaintext wallet profiles
//!
//! Profiles carry no secret material by construction; the whole system
//! depends on that invariant to read them without decryption.

use crate::error::{Error, Result};
use crate::notify::{emit, StoreEvent};
use rusqlite::{params, Connection, OptionalExtension};
use xrpl_vault_core::{Profile, WalletType};

pub(crate) fn wallet_type_to_str(wallet_type: WalletType) -> &'static str {
    match wallet_type {
        WalletType::Pin => "pin",
        WalletType::Oauth => "oauth",
        WalletType::Device => "device",
    }
}

pub(crate) fn wallet_type_from_str(text: &str) -> Result<WalletType> {
    match text {
        "pin" => Ok(WalletType::Pin),
        "oauth" => Ok(WalletType::Oauth),
        "device" => Ok(WalletType::Device),
        other => Err(Error::Storage(format!("Unknown wallet type: {other}"))),
    }
}

/// Profile storage
pub struct ProfileStore;

impl ProfileStore {
    /// Replace the whole collection: clear, then insert every given
    /// profile in one transaction. Any profile missing from the new
    /// list is gone afterwards.
    pub fn store_profiles(conn: &Connection, profiles: &[Profile]) -> Result<()> {
        conn.execute_batch("BEGIN")?;
        let result = (|| -> Result<()> {
            conn.execute("DELETE FROM profiles", [])?;
            for profile in profiles {
                Self::insert(conn, profile)?;
            }
            Ok(())
        })();

        match result {
            Ok(()) => conn.execute_batch("COMMIT")?,
            Err(e) => {
                conn.execute_batch("ROLLBACK")?;
                return Err(e);
            }
        }

        emit(StoreEvent::ProfilesUpdated);
        Ok(())
    }

    /// List every known profile
    pub fn get_profiles(conn: &Connection) -> Result<Vec<Profile>> {
        let mut stmt = conn.prepare(
            "SELECT account, address, public_key, wallet_type, provider, provider_id, \
             account_index, created_at FROM profiles ORDER BY account_index ASC, account ASC",
        )?;

        let profiles = stmt
            .query_map([], Self::row_to_profile)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(profiles)
    }

    /// Upsert one profile
    pub fn add_profile(conn: &Connection, profile: &Profile) -> Result<()> {
        Self::insert(conn, profile)?;
        emit(StoreEvent::ProfilesUpdated);
        Ok(())
    }

    /// Delete one profile by account
    pub fn remove_profile(conn: &Connection, account: &str) -> Result<()> {
        conn.execute("DELETE FROM profiles WHERE account = ?1", params![account])?;
        emit(StoreEvent::ProfilesUpdated);
        Ok(())
    }

    /// Look up the profile linked to an external identity
    pub fn find_by_provider(
        conn: &Connection,
        provider: &str,
        provider_id: &str,
    ) -> Result<Option<Profile>> {
        let profile = conn
            .query_row(
                "SELECT account, address, public_key, wallet_type, provider, provider_id, \
                 account_index, created_at FROM profiles \
                 WHERE provider = ?1 AND provider_id = ?2",
                params![provider, provider_id],
                Self::row_to_profile,
            )
            .optional()?;

        Ok(profile)
    }

    fn insert(conn: &Connection, profile: &Profile) -> Result<()> {
        conn.execute(
            r#"
            INSERT OR REPLACE INTO profiles
                (account, address, public_key, wallet_type, provider, provider_id,
                 account_index, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                profile.account,
                profile.address,
                profile.public_key,
                wallet_type_to_str(profile.wallet_type),
                profile.provider,
                profile.provider_id,
                profile.account_index,
                profile.created_at,
            ],
        )?;
        Ok(())
    }

    fn row_to_profile(row: &rusqlite::Row) -> rusqlite::Result<Profile> {
        let wallet_type_text: String = row.get(3)?;
        let wallet_type = wallet_type_from_str(&wallet_type_text).map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                3,
                rusqlite::types::Type::Text,
                format!("unknown wallet type: {wallet_type_text}").into(),
            )
        })?;

        Ok(Profile {
            account: row.get(0)?,
            address: row.get(1)?,
            public_key: row.get(2)?,
            wallet_type,
            provider: row.get(4)?,
            provider_id: row.get(5)?,
            account_index: row.get(6)?,
            created_at: row.get(7)?,
        })
    }
}
