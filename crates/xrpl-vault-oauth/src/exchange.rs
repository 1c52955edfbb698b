//! Token exchange with the backend
//!
//! Codes and verifiers from the redirect are swapped for a session
//! token at the backend exchange endpoint. The trait seam lets the
//! bridge be tested without a network.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const EXCHANGE_TIMEOUT: Duration = Duration::from_secs(30);

/// One exchange request, matching the callback shape it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "grant", rename_all = "snake_case")]
pub enum ExchangeRequest {
    /// Plain authorization code
    AuthCode {
        /// Provider the code belongs to
        provider: String,
        /// Authorization code
        code: String,
    },
    /// PKCE code with its verifier
    Pkce {
        /// Authorization code
        code: String,
        /// State the flow was started with
        state: String,
        /// Code verifier matching the challenge
        verifier: String,
        /// Redirect URI the code was issued for
        #[serde(rename = "redirectUri")]
        redirect_uri: String,
    },
    /// OAuth 1.0a verifier pair plus the stored request-token secret
    OAuth1 {
        /// Request token
        oauth_token: String,
        /// Verifier from the redirect
        oauth_verifier: String,
        /// Request-token secret stashed before the redirect
        token_secret: String,
    },
}

impl ExchangeRequest {
    /// Provider name for error reporting
    pub fn provider(&self) -> &str {
        match self {
            Self::AuthCode { provider, .. } => provider,
            Self::Pkce { .. } => "pkce",
            Self::OAuth1 { .. } => "twitter",
        }
    }
}

/// Successful exchange result
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExchangeResponse {
    /// Backend-issued session token (compact JWT)
    pub token: String,
    /// Stable provider-side user id
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Provider that authenticated the user
    pub provider: String,
}

/// Exchange seam
#[async_trait::async_trait]
pub trait TokenExchanger: Send + Sync {
    /// Swap a grant for a session token
    async fn exchange(&self, request: ExchangeRequest) -> Result<ExchangeResponse>;
}

/// HTTP exchanger against the backend endpoint
pub struct HttpExchanger {
    client: reqwest::Client,
    endpoint: url::Url,
}

#[derive(Deserialize)]
struct ExchangeErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl HttpExchanger {
    /// Build an exchanger for the given endpoint
    pub fn new(endpoint: url::Url) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(EXCHANGE_TIMEOUT)
            .build()?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait::async_trait]
impl TokenExchanger for HttpExchanger {
    async fn exchange(&self, request: ExchangeRequest) -> Result<ExchangeResponse> {
        let provider = request.provider().to_string();

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    Error::Timeout
                } else {
                    Error::Http(err)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            // Prefer the backend's own reason when the body yields one.
            let message = response
                .json::<ExchangeErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message.or(body.error))
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Err(Error::ExchangeFailed { message, provider });
        }

        Ok(response.json().await?)
    }
}
