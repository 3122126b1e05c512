//! Magic-link records and redemption outcomes.

use serde::Serialize;
use thiserror::Error;

use super::{LoginToken, Role, TokenHash};
use crate::domain::foundation::{EmailAddress, Timestamp};

/// Links expire thirty minutes after issue.
pub const MAGIC_LINK_TTL_MINUTES: i64 = 30;

/// Stored login link; only the token hash is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagicLink {
    pub token_hash: TokenHash,
    pub email: EmailAddress,
    pub role: Role,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
    pub used_at: Option<Timestamp>,
}

impl MagicLink {
    /// Issues a fresh link, returning the raw token for delivery and the record to store.
    pub fn issue(email: EmailAddress, role: Role, now: Timestamp) -> (LoginToken, Self) {
        let token = LoginToken::generate();
        let record = Self {
            token_hash: token.hash(),
            email,
            role,
            created_at: now,
            expires_at: now.plus_minutes(MAGIC_LINK_TTL_MINUTES),
            used_at: None,
        };
        (token, record)
    }

    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        !now.is_before(&self.expires_at)
    }

    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }

    /// Redemption check in precedence order: used, then expired.
    pub fn check_redeemable(&self, now: Timestamp) -> Result<(), RedeemFailure> {
        if self.is_used() {
            return Err(RedeemFailure::Used { role: self.role });
        }
        if self.is_expired_at(now) {
            return Err(RedeemFailure::Expired { role: self.role });
        }
        Ok(())
    }

    /// Eligible for cleanup once expired or used.
    pub fn is_removable_at(&self, now: Timestamp) -> bool {
        self.is_used() || self.is_expired_at(now)
    }
}

/// Identity granted by a successful redemption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedeemedLink {
    pub email: EmailAddress,
    pub role: Role,
}

/// Why a presented token could not be redeemed.
///
/// Used and expired links still know their role, which picks the login page
/// the user is sent back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RedeemFailure {
    #[error("login link is invalid")]
    Invalid,

    #[error("login link was already used")]
    Used { role: Role },

    #[error("login link has expired")]
    Expired { role: Role },
}

impl RedeemFailure {
    pub fn reason(&self) -> LoginFailureReason {
        match self {
            RedeemFailure::Invalid => LoginFailureReason::Invalid,
            RedeemFailure::Used { .. } => LoginFailureReason::Used,
            RedeemFailure::Expired { .. } => LoginFailureReason::Expired,
        }
    }

    /// Role of the link when known, customer otherwise.
    pub fn role(&self) -> Role {
        match self {
            RedeemFailure::Invalid => Role::Customer,
            RedeemFailure::Used { role } | RedeemFailure::Expired { role } => *role,
        }
    }
}

/// Reason code shown to the user on the login page after a failed redemption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginFailureReason {
    Missing,
    Invalid,
    Used,
    Expired,
    Server,
    Config,
}

impl LoginFailureReason {
    pub fn as_code(&self) -> &'static str {
        match self {
            LoginFailureReason::Missing => "missing",
            LoginFailureReason::Invalid => "invalid",
            LoginFailureReason::Used => "used",
            LoginFailureReason::Expired => "expired",
            LoginFailureReason::Server => "server",
            LoginFailureReason::Config => "config",
        }
    }
}
