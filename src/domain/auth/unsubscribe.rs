//! Signed unsubscribe tokens.
//!
//! Token format: `base64url(email) "." base64url(HMAC-SHA256(secret, base64url(email)))`.
//! Tokens never expire; rotating the secret invalidates every outstanding link.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::config::MIN_UNSUBSCRIBE_SECRET_LEN;
use crate::domain::foundation::crypto::{constant_time_eq, hmac_sha256};
use crate::domain::foundation::EmailAddress;

const SEPARATOR: char = '.';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UnsubscribeError {
    #[error("unsubscribe signing key is missing or too short")]
    NotConfigured,

    /// Covers bad format, bad signature and bad payload alike.
    #[error("invalid unsubscribe token")]
    Invalid,
}

/// Signs and verifies unsubscribe tokens with a shared secret.
pub struct UnsubscribeSigner {
    secret: SecretString,
}

impl UnsubscribeSigner {
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    fn key(&self) -> Result<&[u8], UnsubscribeError> {
        let key = self.secret.expose_secret().as_bytes();
        if key.len() < MIN_UNSUBSCRIBE_SECRET_LEN {
            return Err(UnsubscribeError::NotConfigured);
        }
        Ok(key)
    }

    /// Token for `email`; deterministic for a given secret.
    pub fn sign(&self, email: &EmailAddress) -> Result<String, UnsubscribeError> {
        let key = self.key()?;
        let payload = URL_SAFE_NO_PAD.encode(email.as_str());
        let signature = URL_SAFE_NO_PAD.encode(hmac_sha256(key, &[payload.as_bytes()]));
        Ok(format!("{payload}{SEPARATOR}{signature}"))
    }

    /// Address the token was issued for.
    ///
    /// Splits on the last separator and compares signatures in constant time.
    pub fn verify(&self, token: &str) -> Result<EmailAddress, UnsubscribeError> {
        let key = self.key()?;
        let (payload, signature) = token
            .rsplit_once(SEPARATOR)
            .ok_or(UnsubscribeError::Invalid)?;

        let expected = URL_SAFE_NO_PAD.encode(hmac_sha256(key, &[payload.as_bytes()]));
        if !constant_time_eq(signature.as_bytes(), expected.as_bytes()) {
            return Err(UnsubscribeError::Invalid);
        }

        let decoded = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| UnsubscribeError::Invalid)?;
        let email = String::from_utf8(decoded).map_err(|_| UnsubscribeError::Invalid)?;
        EmailAddress::parse(&email).map_err(|_| UnsubscribeError::Invalid)
    }

    /// Verifies `token` and checks it was issued for `presented`.
    pub fn verify_for(&self, token: &str, presented: &str) -> Result<EmailAddress, UnsubscribeError> {
        let email = self.verify(token)?;
        let presented = EmailAddress::parse(presented).map_err(|_| UnsubscribeError::Invalid)?;
        if email != presented {
            return Err(UnsubscribeError::Invalid);
        }
        Ok(email)
    }
}
