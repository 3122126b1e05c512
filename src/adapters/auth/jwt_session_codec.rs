//! HS256 JWT implementation of the `SessionCodec` port.
//!
//! Only HS256 is accepted, which rules out `alg: none` and algorithm
//! confusion. Expiry is enforced twice with zero leeway: by `jsonwebtoken`
//! against the system clock while decoding, then against the caller's clock.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::MIN_SESSION_SECRET_LEN;
use crate::domain::auth::{Role, SessionClaims, SessionError};
use crate::domain::foundation::{EmailAddress, LeadId, Timestamp};
use crate::ports::SessionCodec;

/// Claims as they appear inside the token.
#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    email: String,
    role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lead_id: Option<LeadId>,
    iat: i64,
    exp: i64,
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

pub struct JwtSessionCodec {
    keys: Option<Keys>,
    validation: Validation,
}

impl JwtSessionCodec {
    /// A secret shorter than the minimum leaves the codec unconfigured:
    /// issuing fails and every token is rejected.
    pub fn new(secret: SecretString) -> Self {
        let raw = secret.expose_secret().as_bytes();
        let keys = (raw.len() >= MIN_SESSION_SECRET_LEN).then(|| Keys {
            encoding: EncodingKey::from_secret(raw),
            decoding: DecodingKey::from_secret(raw),
        });
        if keys.is_none() {
            tracing::error!(
                min_len = MIN_SESSION_SECRET_LEN,
                "session secret missing or too short; sessions disabled"
            );
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        Self { keys, validation }
    }

    pub fn is_configured(&self) -> bool {
        self.keys.is_some()
    }
}

impl SessionCodec for JwtSessionCodec {
    fn issue(&self, claims: &SessionClaims) -> Result<String, SessionError> {
        let keys = self.keys.as_ref().ok_or(SessionError::NotConfigured {
            min_len: MIN_SESSION_SECRET_LEN,
        })?;

        let wire = WireClaims {
            email: claims.email.as_str().to_string(),
            role: claims.role,
            lead_id: claims.lead_id,
            iat: Timestamp::now().as_unix_secs(),
            exp: claims.expires_at.as_unix_secs(),
        };

        encode(&Header::new(Algorithm::HS256), &wire, &keys.encoding)
            .map_err(|e| SessionError::Encoding(e.to_string()))
    }

    fn verify_at(&self, token: &str, now: Timestamp) -> Option<SessionClaims> {
        let Some(keys) = self.keys.as_ref() else {
            tracing::error!("session verification attempted without a signing key");
            return None;
        };

        let data = match decode::<WireClaims>(token, &keys.decoding, &self.validation) {
            Ok(data) => data,
            Err(e) => {
                tracing::debug!(error = %e, "session token rejected");
                return None;
            }
        };
        let wire = data.claims;

        if wire.exp <= now.as_unix_secs() {
            tracing::debug!(exp = wire.exp, "session token expired");
            return None;
        }

        let email = match EmailAddress::parse(&wire.email) {
            Ok(email) => email,
            Err(e) => {
                tracing::warn!(error = %e, "session token carries malformed email");
                return None;
            }
        };

        Some(SessionClaims {
            email,
            role: wire.role,
            lead_id: match wire.role {
                Role::Customer => wire.lead_id,
                Role::Admin => None,
            },
            expires_at: Timestamp::from_unix_secs(wire.exp)?,
        })
    }
}
