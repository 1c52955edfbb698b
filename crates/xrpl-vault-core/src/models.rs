//! Shared vault models

use crate::codec::EncryptedBlob;
use serde::{Deserialize, Serialize};

/// How a wallet was created / is unlocked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletType {
    /// Created locally, unlocked with a six-digit PIN
    Pin,
    /// Created through a social-login identity
    Oauth,
    /// Unlocked through a device/passkey credential
    Device,
}

/// A single wallet entry inside the encrypted vault blob.
///
/// `seed` must never exist in plaintext outside a decrypted in-memory
/// instance of this struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletRecord {
    /// Family seed (secret)
    pub seed: String,
    /// Classic address
    pub address: String,
    /// `ED`-prefixed hex public key
    #[serde(rename = "publicKey")]
    pub public_key: String,
    /// Creation time, unix milliseconds
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    /// Wallet flavor
    #[serde(rename = "walletType")]
    pub wallet_type: WalletType,
    /// Position within the bundle
    #[serde(rename = "accountIndex")]
    pub account_index: u32,
}

/// The decrypted shape of the `main_wallet` vault row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletBundle {
    /// All wallets on this device
    pub wallets: Vec<WalletRecord>,
}

/// Non-secret projection of a wallet, safe for plaintext storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Primary key; equals the wallet address
    pub account: String,
    /// Classic address
    pub address: String,
    /// Public key
    #[serde(rename = "publicKey")]
    pub public_key: String,
    /// Wallet flavor
    #[serde(rename = "walletType")]
    pub wallet_type: WalletType,
    /// OAuth provider, when the wallet is provider-linked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Stable provider-side user id
    #[serde(default, rename = "providerId", skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    /// Position within the bundle
    #[serde(rename = "accountIndex")]
    pub account_index: u32,
    /// Creation time, unix milliseconds
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

impl Profile {
    /// Project a wallet record into its public profile.
    ///
    /// Copies no secret field by construction.
    pub fn from_wallet(wallet: &WalletRecord) -> Self {
        Self {
            account: wallet.address.clone(),
            address: wallet.address.clone(),
            public_key: wallet.public_key.clone(),
            wallet_type: wallet.wallet_type,
            provider: None,
            provider_id: None,
            account_index: wallet.account_index,
            created_at: wallet.created_at,
        }
    }

    /// Attach a provider linkage
    pub fn with_provider(mut self, provider: String, provider_id: String) -> Self {
        self.provider = Some(provider);
        self.provider_id = Some(provider_id);
        self
    }
}

/// Device-sealed copy of the unlock secret, keyed by passkey id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Device/passkey identifier (primary key)
    #[serde(rename = "passkeyId")]
    pub passkey_id: String,
    /// Encrypted unlock secret
    pub blob: EncryptedBlob,
}

/// A saved payout destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalAddress {
    /// Row id (autoincrement)
    pub id: i64,
    /// Owning signed-in user address (plaintext filter key)
    #[serde(rename = "userAddress")]
    pub user_address: String,
    /// Display name
    pub name: String,
    /// Destination address
    pub address: String,
    /// Optional destination tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Creation time, unix milliseconds
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    /// Last update time, unix milliseconds
    #[serde(default, rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

/// Encrypted portion of a withdrawal address.
///
/// Excludes `user_address`, which stays plaintext as the filter column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalAddressBody {
    /// Display name
    pub name: String,
    /// Destination address
    pub address: String,
    /// Optional destination tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Creation time, unix milliseconds
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    /// Last update time, unix milliseconds
    #[serde(default, rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl WithdrawalAddressBody {
    /// Combine with storage metadata into the full record
    pub fn into_record(self, id: i64, user_address: String) -> WithdrawalAddress {
        WithdrawalAddress {
            id,
            user_address,
            name: self.name,
            address: self.address,
            tag: self.tag,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_wallet() -> WalletRecord {
        WalletRecord {
            seed: "sEdTM1uX8pu2do5XvTnutH6HsouMaM2".to_string(),
            address: "rG31cLyErnqeVj2eomEjBZtq7PYaupGYzL".to_string(),
            public_key: "EDA57EBBCB502C2009EFE17229E8DC865DCCB192C52D7888D624DC9EBADDB815F0"
                .to_string(),
            created_at: 1_700_000_000_000,
            wallet_type: WalletType::Pin,
            account_index: 0,
        }
    }

    #[test]
    fn test_profile_projection_has_no_seed() {
        let wallet = sample_wallet();
        let profile = Profile::from_wallet(&wallet);
        assert_eq!(profile.account, wallet.address);
        assert_eq!(profile.public_key, wallet.public_key);

        let json = serde_json::to_string(&profile).unwrap();
        assert!(!json.contains(&wallet.seed));
        assert!(!json.contains("seed"));
    }

    #[test]
    fn test_profile_provider_linkage() {
        let profile = Profile::from_wallet(&sample_wallet())
            .with_provider("google".to_string(), "uid-123".to_string());
        assert_eq!(profile.provider.as_deref(), Some("google"));
        assert_eq!(profile.provider_id.as_deref(), Some("uid-123"));
    }

    #[test]
    fn test_wallet_type_serde_names() {
        assert_eq!(
            serde_json::to_string(&WalletType::Oauth).unwrap(),
            r#""oauth""#
        );
        let parsed: WalletType = serde_json::from_str(r#""pin""#).unwrap();
        assert_eq!(parsed, WalletType::Pin);
    }

    #[test]
    fn test_withdrawal_body_into_record() {
        let body = WithdrawalAddressBody {
            name: "Exchange".to_string(),
            address: "rXYZ".to_string(),
            tag: Some("123".to_string()),
            created_at: 1,
            updated_at: None,
        };
        let record = body.into_record(7, "rUser".to_string());
        assert_eq!(record.id, 7);
        assert_eq!(record.user_address, "rUser");
        assert_eq!(record.tag.as_deref(), Some("123"));
    }
}
