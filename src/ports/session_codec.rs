//! SessionCodec port - signed, tamper-evident session tokens.
//!
//! `verify` reports only valid/invalid. Implementations log the reason
//! (expired, bad signature, malformed) but never return it.

use crate::domain::auth::{SessionClaims, SessionError};
use crate::domain::foundation::Timestamp;

pub trait SessionCodec: Send + Sync {
    fn issue(&self, claims: &SessionClaims) -> Result<String, SessionError>;

    /// Claims of a well-formed, correctly signed, unexpired token.
    fn verify_at(&self, token: &str, now: Timestamp) -> Option<SessionClaims>;

    fn verify(&self, token: &str) -> Option<SessionClaims> {
        self.verify_at(token, Timestamp::now())
    }
}
