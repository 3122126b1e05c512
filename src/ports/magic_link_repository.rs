//! MagicLinkRepository port - storage for single-use login links.
//!
//! Only token hashes are stored. Redemption must be an atomic
//! test-and-set: of any number of concurrent redemptions of one token,
//! exactly one succeeds.

use async_trait::async_trait;

use crate::domain::auth::{MagicLink, RedeemFailure, RedeemedLink, TokenHash};
use crate::domain::foundation::{DomainError, Timestamp};

/// Result of presenting a token hash for redemption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedeemOutcome {
    /// The link was unused and unexpired and is now marked used.
    Redeemed(RedeemedLink),
    Rejected(RedeemFailure),
}

#[async_trait]
pub trait MagicLinkRepository: Send + Sync {
    /// Stores a newly issued link.
    async fn insert(&self, link: &MagicLink) -> Result<(), DomainError>;

    /// Marks the link used if it exists, is unused, and has not expired at `now`.
    ///
    /// Rejections classify in order: unknown hash, already used, expired.
    async fn redeem(&self, token_hash: &TokenHash, now: Timestamp)
        -> Result<RedeemOutcome, DomainError>;

    /// Deletes every link that is expired at `now` or already used.
    ///
    /// Returns the number of rows removed.
    async fn delete_expired_or_used(&self, now: Timestamp) -> Result<u64, DomainError>;
}
