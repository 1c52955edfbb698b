//! OAuth-to-wallet bridge for the XRPL wallet vault
//!
//! Turns a provider redirect into a wallet session: the callback query
//! is decoded into a typed shape, the grant is exchanged for a backend
//! token, and the authenticated identity is resolved against the local
//! profile store. A known identity logs straight in (with a cached
//! device credential offered for silent unlock); a new identity hands
//! off to the wallet setup flow.
//!
//! The provider never sees a wallet secret, and the wallet vault never
//! sees provider credentials; the only thing crossing the boundary is
//! the stable `{provider, provider_id}` pair.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bridge;
pub mod callback;
pub mod error;
pub mod exchange;
pub mod identity;
pub mod session;

pub use bridge::{BridgeOutcome, CompletedSetup, OAuthWalletBridge};
pub use callback::CallbackParams;
pub use error::{failure_for, CallbackFailure, Error, Result};
pub use exchange::{ExchangeRequest, ExchangeResponse, HttpExchanger, TokenExchanger};
pub use identity::{decode_identity, ExternalIdentity};
pub use session::{
    BridgeSession, MemorySessionStore, PendingSetup, PkceSession, SessionStore, GUARD_STALENESS,
};
