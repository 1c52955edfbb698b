//! Identity extraction from the backend token
//!
//! The backend signs the token and verifies it on every API call; the
//! client only needs the stable identity out of the claims, so the
//! payload segment is decoded without signature verification.

use crate::error::{Error, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;

/// The provider-scoped identity inside a session token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    /// Authenticating provider
    pub provider: String,
    /// Stable provider-side user id (`sub` claim)
    pub provider_id: String,
}

#[derive(Deserialize)]
struct TokenClaims {
    sub: String,
    #[serde(default)]
    provider: Option<String>,
}

/// Read the identity claims from a compact JWT.
pub fn decode_identity(jwt: &str) -> Result<ExternalIdentity> {
    let mut segments = jwt.split('.');
    let payload = match (segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_)) => payload,
        _ => return Err(Error::Callback("token is not a compact JWT".to_string())),
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| Error::Callback(format!("token payload is not base64url: {e}")))?;
    let claims: TokenClaims = serde_json::from_slice(&bytes)?;

    Ok(ExternalIdentity {
        provider: claims.provider.unwrap_or_else(|| "unknown".to_string()),
        provider_id: claims.sub,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unsigned_jwt(claims: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
        format!("{header}.{payload}.sig")
    }

    #[test]
    fn test_decodes_sub_and_provider() {
        let jwt = unsigned_jwt(&serde_json::json!({
            "sub": "uid-1",
            "provider": "google",
            "exp": 1_700_003_600,
        }));
        let identity = decode_identity(&jwt).unwrap();
        assert_eq!(identity.provider, "google");
        assert_eq!(identity.provider_id, "uid-1");
    }

    #[test]
    fn test_missing_provider_defaults_to_unknown() {
        let jwt = unsigned_jwt(&serde_json::json!({ "sub": "uid-1" }));
        let identity = decode_identity(&jwt).unwrap();
        assert_eq!(identity.provider, "unknown");
    }

    #[test]
    fn test_rejects_non_jwt_shapes() {
        assert!(decode_identity("not-a-jwt").is_err());
        assert!(decode_identity("one.two").is_err());
        assert!(decode_identity("a.!!!.c").is_err());
    }

    #[test]
    fn test_rejects_payload_without_sub() {
        let jwt = unsigned_jwt(&serde_json::json!({ "provider": "google" }));
        assert!(decode_identity(&jwt).is_err());
    }
}
