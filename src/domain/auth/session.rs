//! Session claims and codec errors.

use thiserror::Error;

use super::Role;
use crate::domain::foundation::{EmailAddress, LeadId, Timestamp};

/// Sessions are valid for seven days from issue.
pub const SESSION_TTL_DAYS: i64 = 7;

/// Claims carried by a signed session token.
///
/// Customer sessions may carry the lead bound at login; admin sessions never do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub email: EmailAddress,
    pub role: Role,
    pub lead_id: Option<LeadId>,
    pub expires_at: Timestamp,
}

impl SessionClaims {
    /// Claims for a session starting at `now`; expiry has whole-second precision.
    pub fn new(email: EmailAddress, role: Role, lead_id: Option<LeadId>, now: Timestamp) -> Self {
        let lead_id = match role {
            Role::Customer => lead_id,
            Role::Admin => None,
        };
        Self {
            email,
            role,
            lead_id,
            expires_at: now.plus_days(SESSION_TTL_DAYS).truncated_to_secs(),
        }
    }

    pub fn customer(email: EmailAddress, lead_id: Option<LeadId>, now: Timestamp) -> Self {
        Self::new(email, Role::Customer, lead_id, now)
    }

    pub fn admin(email: EmailAddress, now: Timestamp) -> Self {
        Self::new(email, Role::Admin, None, now)
    }

    /// A session is expired once `now` reaches its expiry instant.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        !now.is_before(&self.expires_at)
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }
}

/// Failures while issuing a session token.
///
/// Verification never reports why a token was rejected; see `SessionCodec`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("session signing key is missing or shorter than {min_len} bytes")]
    NotConfigured { min_len: usize },

    #[error("failed to encode session token: {0}")]
    Encoding(String),
}
