//! Encrypted wallet vault
//!
//! One logical row (`main_wallet`) per device holds the encrypted bundle
//! of wallet records. The whole blob is decrypted, modified, and
//! re-encrypted on every mutation; there are no partial field updates.

use crate::error::{Error, Result};
use crate::notify::{emit, StoreEvent};
use crate::profile_store::ProfileStore;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Deserialize;
use xrpl_vault_core::{
    codec, pin, EncryptedBlob, Profile, WalletBundle, WalletRecord, WalletType, XrplKeyring,
};

/// Fixed id of the single vault row
pub const MAIN_WALLET_ID: &str = "main_wallet";

/// Stored blob shapes: current bundle, or the legacy bare-record form
/// written before multi-wallet support.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredWallets {
    Bundle(WalletBundle),
    Legacy(WalletRecord),
}

/// Wallet vault storage
pub struct WalletVault;

impl WalletVault {
    /// Encrypt and write the full wallet set, overwriting any previous
    /// row. Last-writer-wins; no merge.
    pub fn store_wallets(conn: &Connection, records: &[WalletRecord], secret: &str) -> Result<()> {
        let bundle = WalletBundle {
            wallets: records.to_vec(),
        };
        let blob = codec::encrypt(&bundle, secret)?;
        Self::write_blob(conn, &blob)?;
        emit(StoreEvent::WalletsChanged);
        Ok(())
    }

    /// Decrypt and return every wallet on this device.
    ///
    /// A legacy blob holding a bare record normalizes to a one-element
    /// vec. Fails with [`Error::NoWalletFound`] when no row exists and
    /// [`Error::InvalidSecret`] when the secret is wrong.
    pub fn get_wallets(conn: &Connection, secret: &str) -> Result<Vec<WalletRecord>> {
        let blob = Self::read_blob(conn)?.ok_or(Error::NoWalletFound)?;

        let stored: StoredWallets = codec::decrypt(&blob, secret)?;
        Ok(match stored {
            StoredWallets::Bundle(bundle) => bundle.wallets,
            StoredWallets::Legacy(record) => vec![record],
        })
    }

    /// Return the active wallet.
    ///
    /// Only one account is actively used per device: the storage format
    /// supports many records but the unlock surface is index 0.
    pub fn get_wallet(conn: &Connection, secret: &str) -> Result<WalletRecord> {
        Self::get_wallets(conn, secret)?
            .into_iter()
            .next()
            .ok_or(Error::NoWalletFound)
    }

    /// Existence check without decryption; never fails on a wrong or
    /// missing secret since none is involved.
    pub fn has_wallet(conn: &Connection) -> Result<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM encrypted_wallets WHERE id = ?1",
            params![MAIN_WALLET_ID],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Remove the vault row entirely. No soft-delete.
    pub fn delete_wallet(conn: &Connection) -> Result<()> {
        conn.execute(
            "DELETE FROM encrypted_wallets WHERE id = ?1",
            params![MAIN_WALLET_ID],
        )?;
        emit(StoreEvent::WalletsChanged);
        Ok(())
    }

    /// Append one record to the bundle: decrypt, push, re-encrypt, write.
    ///
    /// Not atomic with respect to other processes; the later writer wins.
    pub fn append_wallet(conn: &Connection, record: WalletRecord, secret: &str) -> Result<()> {
        let mut wallets = Self::get_wallets(conn, secret)?;
        wallets.push(record);
        Self::store_wallets(conn, &wallets, secret)
    }

    /// Create the device's wallet from a freshly chosen PIN.
    ///
    /// Validates the PIN policy, generates a keypair, stores a
    /// one-record bundle, and writes the matching profile.
    pub fn create_from_pin(
        conn: &Connection,
        keyring: &dyn XrplKeyring,
        pin: &str,
    ) -> Result<WalletRecord> {
        pin::validate(pin)?;
        Self::create_initial(conn, keyring, pin, WalletType::Pin, None)
    }

    /// Create the device's wallet for a social-login identity.
    ///
    /// The PIN encrypts the vault exactly as in the local flow; the
    /// profile additionally carries the provider linkage so the OAuth
    /// bridge can find this wallet on the next sign-in.
    pub fn create_from_oauth(
        conn: &Connection,
        keyring: &dyn XrplKeyring,
        pin: &str,
        provider: &str,
        provider_id: &str,
    ) -> Result<WalletRecord> {
        pin::validate(pin)?;
        Self::create_initial(
            conn,
            keyring,
            pin,
            WalletType::Oauth,
            Some((provider, provider_id)),
        )
    }

    fn create_initial(
        conn: &Connection,
        keyring: &dyn XrplKeyring,
        secret: &str,
        wallet_type: WalletType,
        provider: Option<(&str, &str)>,
    ) -> Result<WalletRecord> {
        if Self::has_wallet(conn)? {
            return Err(Error::WalletAlreadyExists);
        }

        let keypair = keyring.generate();
        let record = WalletRecord {
            seed: keypair.seed,
            address: keypair.address,
            public_key: keypair.public_key,
            created_at: chrono::Utc::now().timestamp_millis(),
            wallet_type,
            account_index: 0,
        };

        Self::store_wallets(conn, std::slice::from_ref(&record), secret)?;

        let mut profile = Profile::from_wallet(&record);
        if let Some((provider, provider_id)) = provider {
            profile = profile.with_provider(provider.to_string(), provider_id.to_string());
        }
        ProfileStore::add_profile(conn, &profile)?;

        Ok(record)
    }

    fn write_blob(conn: &Connection, blob: &EncryptedBlob) -> Result<()> {
        conn.execute(
            "INSERT OR REPLACE INTO encrypted_wallets (id, blob, timestamp) VALUES (?1, ?2, ?3)",
            params![MAIN_WALLET_ID, serde_json::to_string(blob)?, blob.timestamp],
        )?;
        Ok(())
    }

    fn read_blob(conn: &Connection) -> Result<Option<EncryptedBlob>> {
        let text: Option<String> = conn
            .query_row(
                "SELECT blob FROM encrypted_wallets WHERE id = ?1",
                params![MAIN_WALLET_ID],
                |row| row.get(0),
            )
            .optional()?;

        match text {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use xrpl_vault_core::Ed25519Keyring;

    const PIN: &str = "284719";

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn sample_record(seed: &str, index: u32) -> WalletRecord {
        WalletRecord {
            seed: seed.to_string(),
            address: format!("rAddr{index}"),
            public_key: format!("EDPUB{index}"),
            created_at: 1_700_000_000_000,
            wallet_type: WalletType::Pin,
            account_index: index,
        }
    }

    #[test]
    fn test_store_and_get_wallets() {
        let db = setup_db();
        let records = vec![sample_record("sEdOne", 0), sample_record("sEdTwo", 1)];

        WalletVault::store_wallets(db.conn(), &records, PIN).unwrap();
        let loaded = WalletVault::get_wallets(db.conn(), PIN).unwrap();
        assert_eq!(loaded, records);
    }

    #[test]
    fn test_get_wallet_returns_first() {
        let db = setup_db();
        let records = vec![sample_record("sEdOne", 0), sample_record("sEdTwo", 1)];
        WalletVault::store_wallets(db.conn(), &records, PIN).unwrap();

        let active = WalletVault::get_wallet(db.conn(), PIN).unwrap();
        assert_eq!(active, records[0]);
    }

    #[test]
    fn test_wrong_secret_is_invalid_secret() {
        let db = setup_db();
        WalletVault::store_wallets(db.conn(), &[sample_record("sEdOne", 0)], PIN).unwrap();

        let result = WalletVault::get_wallets(db.conn(), "000000");
        assert!(matches!(result, Err(Error::InvalidSecret)));
    }

    #[test]
    fn test_missing_row_is_no_wallet_found() {
        let db = setup_db();
        let result = WalletVault::get_wallets(db.conn(), PIN);
        assert!(matches!(result, Err(Error::NoWalletFound)));
    }

    #[test]
    fn test_legacy_blob_normalizes_to_one_element() {
        let db = setup_db();
        let record = sample_record("sEdLegacy", 0);
        // Write the pre-bundle shape directly: a bare record, no wrapper.
        let blob = codec::encrypt(&record, PIN).unwrap();
        conn_write(db.conn(), &blob);

        let loaded = WalletVault::get_wallets(db.conn(), PIN).unwrap();
        assert_eq!(loaded, vec![record]);
    }

    fn conn_write(conn: &Connection, blob: &EncryptedBlob) {
        conn.execute(
            "INSERT OR REPLACE INTO encrypted_wallets (id, blob, timestamp) VALUES (?1, ?2, ?3)",
            params![MAIN_WALLET_ID, serde_json::to_string(blob).unwrap(), blob.timestamp],
        )
        .unwrap();
    }

    #[test]
    fn test_has_wallet_and_delete() {
        let db = setup_db();
        assert!(!WalletVault::has_wallet(db.conn()).unwrap());

        WalletVault::store_wallets(db.conn(), &[sample_record("sEdOne", 0)], PIN).unwrap();
        assert!(WalletVault::has_wallet(db.conn()).unwrap());

        WalletVault::delete_wallet(db.conn()).unwrap();
        assert!(!WalletVault::has_wallet(db.conn()).unwrap());
    }

    #[test]
    fn test_append_wallet() {
        let db = setup_db();
        WalletVault::store_wallets(db.conn(), &[sample_record("sEdOne", 0)], PIN).unwrap();
        WalletVault::append_wallet(db.conn(), sample_record("sEdTwo", 1), PIN).unwrap();

        let loaded = WalletVault::get_wallets(db.conn(), PIN).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].seed, "sEdTwo");
        // The active wallet is unchanged by the append.
        assert_eq!(WalletVault::get_wallet(db.conn(), PIN).unwrap().seed, "sEdOne");
    }

    #[test]
    fn test_create_from_pin_lifecycle() {
        let db = setup_db();
        let created = WalletVault::create_from_pin(db.conn(), &Ed25519Keyring, PIN).unwrap();

        let wallets = WalletVault::get_wallets(db.conn(), PIN).unwrap();
        assert_eq!(wallets.len(), 1);

        let unlocked = WalletVault::get_wallet(db.conn(), PIN).unwrap();
        assert_eq!(unlocked, created);
        assert!(unlocked.seed.starts_with("sEd"));
        assert!(unlocked.address.starts_with('r'));

        let result = WalletVault::get_wallet(db.conn(), "905031");
        assert!(matches!(result, Err(Error::InvalidSecret)));
    }

    #[test]
    fn test_create_from_pin_rejects_weak_pin() {
        let db = setup_db();
        assert!(matches!(
            WalletVault::create_from_pin(db.conn(), &Ed25519Keyring, "123456"),
            Err(Error::Validation(_))
        ));
        assert!(!WalletVault::has_wallet(db.conn()).unwrap());
    }

    #[test]
    fn test_create_refuses_overwrite() {
        let db = setup_db();
        WalletVault::create_from_pin(db.conn(), &Ed25519Keyring, PIN).unwrap();
        assert!(matches!(
            WalletVault::create_from_pin(db.conn(), &Ed25519Keyring, "905031"),
            Err(Error::WalletAlreadyExists)
        ));
    }

    #[test]
    fn test_create_from_oauth_links_profile() {
        let db = setup_db();
        WalletVault::create_from_oauth(db.conn(), &Ed25519Keyring, PIN, "google", "uid-1")
            .unwrap();

        let profile = ProfileStore::find_by_provider(db.conn(), "google", "uid-1")
            .unwrap()
            .expect("profile should be linked");
        assert_eq!(profile.wallet_type, WalletType::Oauth);
    }
}
