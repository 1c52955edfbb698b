//! Bridge session state
//!
//! The callback flow spans a navigation, so its intermediate state
//! (processing guard, used codes, PKCE stash, OAuth1 token secret,
//! pending setup) lives in a [`SessionStore`] rather than in the bridge
//! struct. [`BridgeSession`] gives that state typed accessors; nothing
//! else reads raw keys.

use crate::error::{Error, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// How long a processing guard may linger before it is considered
/// abandoned and self-clears.
pub const GUARD_STALENESS: Duration = Duration::from_secs(8);

const KEY_PROCESSING: &str = "oauth_processing_since";
const KEY_PKCE: &str = "oauth_pkce";
const KEY_OAUTH1_SECRET: &str = "oauth1_token_secret";
const KEY_PENDING_SETUP: &str = "oauth_pending_setup";

/// Navigation-surviving key/value storage
pub trait SessionStore: Send + Sync {
    /// Read a value
    fn get(&self, key: &str) -> Option<String>;
    /// Write a value
    fn set(&self, key: &str, value: String);
    /// Delete and return a value
    fn remove(&self, key: &str) -> Option<String>;
    /// Delete everything
    fn clear(&self);
}

/// In-memory session store
#[derive(Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.entries.lock().insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) -> Option<String> {
        self.entries.lock().remove(key)
    }

    fn clear(&self) {
        self.entries.lock().clear();
    }
}

/// PKCE state stashed before the provider redirect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PkceSession {
    /// CSRF state sent with the authorization request
    pub state: String,
    /// Code verifier matching the challenge
    pub verifier: String,
    /// Redirect URI the code was issued for
    #[serde(rename = "redirectUri")]
    pub redirect_uri: String,
}

/// Identity waiting for the user to choose an unlock secret
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSetup {
    /// Backend-issued token
    pub token: String,
    /// Provider of the identity
    pub provider: String,
    /// Stable provider-side user id
    #[serde(rename = "providerId")]
    pub provider_id: String,
}

/// Typed view over the bridge's session state
pub struct BridgeSession<S: SessionStore> {
    store: S,
}

impl<S: SessionStore> BridgeSession<S> {
    /// Wrap a session store
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Acquire the callback processing guard.
    ///
    /// Returns `false` when a fresh guard is already held (a concurrent
    /// callback is in flight). A guard older than [`GUARD_STALENESS`]
    /// belongs to an abandoned run and is replaced.
    pub fn begin_processing(&self) -> bool {
        let now = chrono::Utc::now().timestamp_millis();
        if let Some(since) = self
            .store
            .get(KEY_PROCESSING)
            .and_then(|text| text.parse::<i64>().ok())
        {
            let age = now.saturating_sub(since);
            if age < GUARD_STALENESS.as_millis() as i64 {
                return false;
            }
            tracing::warn!("Clearing stale callback guard ({age}ms old)");
        }
        self.store.set(KEY_PROCESSING, now.to_string());
        true
    }

    /// Release the processing guard
    pub fn end_processing(&self) {
        self.store.remove(KEY_PROCESSING);
    }

    /// Record that an authorization code was consumed
    pub fn mark_code_used(&self, code: &str) {
        self.store.set(&Self::code_key(code), "1".to_string());
    }

    /// Whether an authorization code was already consumed
    pub fn is_code_used(&self, code: &str) -> bool {
        self.store.get(&Self::code_key(code)).is_some()
    }

    /// Stash PKCE state ahead of the provider redirect
    pub fn set_pkce(&self, pkce: &PkceSession) -> Result<()> {
        self.store.set(KEY_PKCE, serde_json::to_string(pkce)?);
        Ok(())
    }

    /// Consume the stashed PKCE state
    pub fn take_pkce(&self) -> Result<PkceSession> {
        let text = self
            .store
            .remove(KEY_PKCE)
            .ok_or_else(|| Error::MissingSession("no PKCE state for this session".to_string()))?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Stash the OAuth1 request-token secret
    pub fn set_oauth1_secret(&self, secret: &str) {
        self.store.set(KEY_OAUTH1_SECRET, secret.to_string());
    }

    /// Consume the stashed OAuth1 request-token secret
    pub fn take_oauth1_secret(&self) -> Result<String> {
        self.store.remove(KEY_OAUTH1_SECRET).ok_or_else(|| {
            Error::MissingSession("no OAuth1 token secret for this session".to_string())
        })
    }

    /// Stash the identity awaiting wallet setup
    pub fn set_pending(&self, pending: &PendingSetup) -> Result<()> {
        self.store
            .set(KEY_PENDING_SETUP, serde_json::to_string(pending)?);
        Ok(())
    }

    /// Consume the identity awaiting wallet setup
    pub fn take_pending(&self) -> Result<PendingSetup> {
        let text = self.store.remove(KEY_PENDING_SETUP).ok_or_else(|| {
            Error::MissingSession("no pending wallet setup".to_string())
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    fn code_key(code: &str) -> String {
        format!("oauth_code_used:{code}")
    }
}
