//! Device-local encryption key
//!
//! The credential vault and withdrawal store encrypt under a device-local
//! secret rather than the user's PIN: they hold convenience data, not
//! spendable material. The provider trait is the seam for substituting a
//! platform keystore (Android Keystore, Keychain, DPAPI, libsecret)
//! while preserving the no-user-prompt property.

use zeroize::Zeroizing;

/// Fixed versioned label used when no platform keystore is registered.
const DEVICE_KEY_LABEL: &str = "xrplto-device-key-v1";

/// Source of the device-local secret.
///
/// Stores run the record codec under `device_secret()` and hold the
/// provider as `&dyn DeviceKeyProvider`, so the trait stays object-safe.
pub trait DeviceKeyProvider: Send + Sync {
    /// Get the device-local secret used to seal convenience records
    fn device_secret(&self) -> Zeroizing<String>;
}

/// Default provider backed by a static label.
///
/// Not device-bound: an attacker who copies the store to another machine
/// can open it. Acceptable for the data this key protects; swap in a
/// keystore-backed provider for stronger binding.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticDeviceKey;

impl DeviceKeyProvider for StaticDeviceKey {
    fn device_secret(&self) -> Zeroizing<String> {
        Zeroizing::new(DEVICE_KEY_LABEL.to_string())
    }
}
