//! Redirect callback decoding
//!
//! The provider redirect lands with one of several query shapes. The
//! whole query is decoded exactly once into a [`CallbackParams`] value;
//! downstream code matches on the variant instead of re-reading raw
//! parameters.

use crate::error::{Error, Result};
use std::collections::HashMap;

/// One decoded redirect callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackParams {
    /// The provider reported an error instead of a grant
    ErrorParam {
        /// Machine error code (`error` parameter)
        error: String,
        /// Human-readable detail, when present
        description: Option<String>,
    },
    /// Implicit-style flow: the token arrives directly in the redirect
    DirectToken {
        /// Bearer token issued by the backend
        token: String,
        /// Provider that produced it
        provider: String,
    },
    /// OAuth 1.0a verifier pair (Twitter-style)
    OAuth1Verifier {
        /// Request token being verified
        oauth_token: String,
        /// Verifier to exchange with the stored token secret
        oauth_verifier: String,
    },
    /// PKCE authorization code plus returned state
    PkceExchange {
        /// Authorization code
        code: String,
        /// State echoed by the provider, checked against the session
        state: String,
    },
    /// Plain authorization code without PKCE
    AuthCode {
        /// Authorization code
        code: String,
        /// Provider the code belongs to
        provider: String,
    },
}

impl CallbackParams {
    /// Decode a raw query string.
    ///
    /// Precedence when multiple parameter sets are present:
    /// error > direct token > OAuth1 pair > PKCE > plain code. Anything
    /// else is a malformed callback.
    pub fn parse(query: &str) -> Result<Self> {
        let params: HashMap<String, String> = url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();

        if let Some(error) = params.get("error") {
            return Ok(Self::ErrorParam {
                error: error.clone(),
                description: params.get("error_description").cloned(),
            });
        }

        if let Some(token) = params.get("token") {
            let provider = params
                .get("provider")
                .cloned()
                .unwrap_or_else(|| "unknown".to_string());
            return Ok(Self::DirectToken {
                token: token.clone(),
                provider,
            });
        }

        if let (Some(oauth_token), Some(oauth_verifier)) =
            (params.get("oauth_token"), params.get("oauth_verifier"))
        {
            return Ok(Self::OAuth1Verifier {
                oauth_token: oauth_token.clone(),
                oauth_verifier: oauth_verifier.clone(),
            });
        }

        if let Some(code) = params.get("code") {
            if let Some(state) = params.get("state") {
                return Ok(Self::PkceExchange {
                    code: code.clone(),
                    state: state.clone(),
                });
            }
            if let Some(provider) = params.get("provider") {
                return Ok(Self::AuthCode {
                    code: code.clone(),
                    provider: provider.clone(),
                });
            }
            return Err(Error::Callback(
                "code present without state or provider".to_string(),
            ));
        }

        Err(Error::Callback("no recognized parameters".to_string()))
    }
}
