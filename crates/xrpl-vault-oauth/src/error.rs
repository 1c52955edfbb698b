//! Error types
//!
//! Every terminal bridge failure is convertible to a [`CallbackFailure`]
//! the UI can show verbatim; callers never have to format an error
//! themselves.

use serde::{Deserialize, Serialize};

/// OAuth bridge errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The redirect query was malformed or incomplete
    #[error("Invalid callback: {0}")]
    Callback(String),

    /// Returned OAuth state does not match the stored one
    #[error("State mismatch: possible CSRF")]
    CsrfMismatch,

    /// The authorization code was already consumed
    #[error("Authorization code already used")]
    CodeReplayed,

    /// The token exchange timed out
    #[error("Token exchange timed out")]
    Timeout,

    /// The backend rejected the token exchange
    #[error("Token exchange failed for {provider}: {message}")]
    ExchangeFailed {
        /// Upstream reason, when the response body carried one
        message: String,
        /// Provider the exchange was for
        provider: String,
    },

    /// Expected session state was absent
    #[error("Missing session state: {0}")]
    MissingSession(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] xrpl_vault_storage_sqlite::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Displayable terminal failure for the callback screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackFailure {
    /// Short heading
    pub title: String,
    /// Full user-facing message
    pub message: String,
    /// Provider the sign-in was attempted with
    pub provider: String,
}

/// Map a bridge error to the message shown on the callback screen.
pub fn failure_for(provider: &str, err: &Error) -> CallbackFailure {
    let (title, message) = match err {
        Error::Timeout => (
            "Connection timed out",
            "The sign-in service took too long to respond. Please try again.".to_string(),
        ),
        Error::CsrfMismatch => (
            "Sign-in could not be verified",
            "The sign-in response did not match this session. Please start over.".to_string(),
        ),
        Error::CodeReplayed => (
            "Sign-in already completed",
            "This sign-in link was already used. Please start a new sign-in.".to_string(),
        ),
        Error::ExchangeFailed { message, .. } => (
            "Sign-in failed",
            format!("The sign-in service rejected the request: {message}"),
        ),
        Error::Callback(msg) => ("Sign-in failed", format!("Invalid sign-in response: {msg}")),
        Error::MissingSession(_) => (
            "Session expired",
            "Your sign-in session expired. Please start over.".to_string(),
        ),
        Error::Http(_) => (
            "Connection failed",
            "Could not reach the sign-in service. Check your connection and try again."
                .to_string(),
        ),
        Error::Storage(_) | Error::Serialization(_) => (
            "Something went wrong",
            "An internal error occurred during sign-in. Please try again.".to_string(),
        ),
    };

    CallbackFailure {
        title: title.to_string(),
        message,
        provider: provider.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_maps_to_retry_messaging() {
        let failure = failure_for("google", &Error::Timeout);
        assert_eq!(failure.title, "Connection timed out");
        assert!(failure.message.contains("try again"));
        assert_eq!(failure.provider, "google");
    }

    #[test]
    fn test_exchange_failure_carries_upstream_reason() {
        let err = Error::ExchangeFailed {
            message: "invalid_grant".to_string(),
            provider: "google".to_string(),
        };
        let failure = failure_for("google", &err);
        assert!(failure.message.contains("invalid_grant"));
    }

    #[test]
    fn test_every_variant_is_displayable() {
        let errors = [
            Error::Callback("no params".to_string()),
            Error::CsrfMismatch,
            Error::CodeReplayed,
            Error::Timeout,
            Error::MissingSession("pkce".to_string()),
        ];
        for err in errors {
            let failure = failure_for("twitter", &err);
            assert!(!failure.title.is_empty());
            assert!(!failure.message.is_empty());
        }
    }
}
