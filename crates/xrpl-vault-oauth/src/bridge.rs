//! OAuth-to-wallet bridge
//!
//! Connects a provider sign-in to the local wallet vault: decode the
//! redirect, exchange the grant for a session token, and resolve the
//! authenticated identity to an existing wallet profile or a pending
//! setup. Every path terminates in a [`BridgeOutcome`]; the callback
//! screen never handles a raw error.

use crate::callback::CallbackParams;
use crate::error::{failure_for, CallbackFailure, Error, Result};
use crate::exchange::{ExchangeRequest, TokenExchanger};
use crate::identity::{decode_identity, ExternalIdentity};
use crate::session::{BridgeSession, PendingSetup, SessionStore};
use rusqlite::Connection;
use std::sync::Arc;
use xrpl_vault_core::{DeviceKeyProvider, Profile, WalletRecord, XrplKeyring};
use xrpl_vault_storage_sqlite::notify::{emit, StoreEvent};
use xrpl_vault_storage_sqlite::{CredentialVault, ProfileStore, WalletVault};

/// Provider used on failures raised before the provider is known
const UNKNOWN_PROVIDER: &str = "unknown";

/// Terminal result of one callback
#[derive(Debug)]
pub enum BridgeOutcome {
    /// The identity maps to an existing wallet
    LoggedIn {
        /// Backend session token
        token: String,
        /// The matched wallet profile
        profile: Profile,
        /// Cached unlock secret, when this device holds one
        silent_secret: Option<String>,
    },
    /// First sign-in with this identity; a wallet must be set up
    RequiresSecret {
        /// Identity stashed until the user picks a PIN
        pending: PendingSetup,
    },
    /// The flow failed; show this and offer a retry
    Failed(CallbackFailure),
}

/// Wallet created by [`OAuthWalletBridge::complete_setup`]
#[derive(Debug)]
pub struct CompletedSetup {
    /// Backend session token carried over from the callback
    pub token: String,
    /// The freshly created wallet
    pub wallet: WalletRecord,
}

/// The sign-in state machine
pub struct OAuthWalletBridge<S: SessionStore> {
    session: BridgeSession<S>,
    exchanger: Arc<dyn TokenExchanger>,
    device: Arc<dyn DeviceKeyProvider>,
}

type StepResult<T> = std::result::Result<T, (String, Error)>;

impl<S: SessionStore> OAuthWalletBridge<S> {
    /// Build a bridge over the given session store and seams
    pub fn new(
        store: S,
        exchanger: Arc<dyn TokenExchanger>,
        device: Arc<dyn DeviceKeyProvider>,
    ) -> Self {
        Self {
            session: BridgeSession::new(store),
            exchanger,
            device,
        }
    }

    /// Session state accessor, for staging PKCE/OAuth1 data before the
    /// provider redirect.
    pub fn session(&self) -> &BridgeSession<S> {
        &self.session
    }

    /// Process one redirect callback end to end.
    pub async fn handle_callback(&self, conn: &Connection, query: &str) -> BridgeOutcome {
        if !self.session.begin_processing() {
            // Another callback owns the guard; it will clear it itself.
            return BridgeOutcome::Failed(failure_for(
                UNKNOWN_PROVIDER,
                &Error::Callback("a sign-in is already being processed".to_string()),
            ));
        }

        let outcome = self.process(conn, query).await;
        self.session.end_processing();

        match outcome {
            Ok(outcome) => outcome,
            Err((provider, err)) => {
                tracing::warn!("Sign-in via {provider} failed: {err}");
                BridgeOutcome::Failed(failure_for(&provider, &err))
            }
        }
    }

    async fn process(&self, conn: &Connection, query: &str) -> StepResult<BridgeOutcome> {
        let params =
            CallbackParams::parse(query).map_err(|e| (UNKNOWN_PROVIDER.to_string(), e))?;

        let (token, identity) = match params {
            CallbackParams::ErrorParam { error, description } => {
                let message = description.unwrap_or(error);
                return Err((UNKNOWN_PROVIDER.to_string(), Error::Callback(message)));
            }

            CallbackParams::DirectToken { token, provider } => {
                let mut identity =
                    decode_identity(&token).map_err(|e| (provider.clone(), e))?;
                if identity.provider == UNKNOWN_PROVIDER {
                    identity.provider = provider;
                }
                (token, identity)
            }

            CallbackParams::OAuth1Verifier {
                oauth_token,
                oauth_verifier,
            } => {
                let token_secret = self
                    .session
                    .take_oauth1_secret()
                    .map_err(|e| ("twitter".to_string(), e))?;
                let request = ExchangeRequest::OAuth1 {
                    oauth_token,
                    oauth_verifier,
                    token_secret,
                };
                self.exchange(request).await?
            }

            CallbackParams::PkceExchange { code, state } => {
                let pkce = self
                    .session
                    .take_pkce()
                    .map_err(|e| (UNKNOWN_PROVIDER.to_string(), e))?;
                if pkce.state != state {
                    return Err((UNKNOWN_PROVIDER.to_string(), Error::CsrfMismatch));
                }
                if self.session.is_code_used(&code) {
                    return Err((UNKNOWN_PROVIDER.to_string(), Error::CodeReplayed));
                }
                // Marked before the exchange so a re-entrant callback
                // can never trigger a second network call for this code.
                self.session.mark_code_used(&code);

                let request = ExchangeRequest::Pkce {
                    code,
                    state,
                    verifier: pkce.verifier,
                    redirect_uri: pkce.redirect_uri,
                };
                self.exchange(request).await?
            }

            CallbackParams::AuthCode { code, provider } => {
                let request = ExchangeRequest::AuthCode {
                    provider: provider.clone(),
                    code,
                };
                self.exchange(request).await?
            }
        };

        let provider = identity.provider.clone();
        self.resolve(conn, token, identity)
            .map_err(|e| (provider, e))
    }

    async fn exchange(&self, request: ExchangeRequest) -> StepResult<(String, ExternalIdentity)> {
        let provider = request.provider().to_string();
        let response = self
            .exchanger
            .exchange(request)
            .await
            .map_err(|e| (provider, e))?;

        let identity = ExternalIdentity {
            provider: response.provider,
            provider_id: response.user_id,
        };
        Ok((response.token, identity))
    }

    fn resolve(
        &self,
        conn: &Connection,
        token: String,
        identity: ExternalIdentity,
    ) -> Result<BridgeOutcome> {
        match ProfileStore::find_by_provider(conn, &identity.provider, &identity.provider_id)? {
            Some(profile) => {
                let silent_secret = CredentialVault::get_wallet_credential(
                    conn,
                    self.device.as_ref(),
                    &passkey_id(&identity.provider, &identity.provider_id),
                )?;
                emit(StoreEvent::ProfilesUpdated);
                Ok(BridgeOutcome::LoggedIn {
                    token,
                    profile,
                    silent_secret,
                })
            }
            None => {
                let pending = PendingSetup {
                    token,
                    provider: identity.provider,
                    provider_id: identity.provider_id,
                };
                self.session.set_pending(&pending)?;
                Ok(BridgeOutcome::RequiresSecret { pending })
            }
        }
    }

    /// Finish a first sign-in: consume the pending identity, create the
    /// wallet with the user's chosen PIN, and cache the unlock secret
    /// under the device key for silent unlock next time.
    ///
    /// A failed creation (weak PIN, existing wallet) re-stashes the
    /// pending identity so the user can retry.
    pub fn complete_setup(
        &self,
        conn: &Connection,
        keyring: &dyn XrplKeyring,
        pin: &str,
    ) -> Result<CompletedSetup> {
        let pending = self.session.take_pending()?;

        let wallet = match WalletVault::create_from_oauth(
            conn,
            keyring,
            pin,
            &pending.provider,
            &pending.provider_id,
        ) {
            Ok(wallet) => wallet,
            Err(e) => {
                self.session.set_pending(&pending)?;
                return Err(e.into());
            }
        };

        CredentialVault::store_wallet_credential(
            conn,
            self.device.as_ref(),
            &passkey_id(&pending.provider, &pending.provider_id),
            pin,
        )?;

        Ok(CompletedSetup {
            token: pending.token,
            wallet,
        })
    }
}

fn passkey_id(provider: &str, provider_id: &str) -> String {
    format!("{provider}:{provider_id}")
}
