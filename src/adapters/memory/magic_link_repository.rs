//! In-memory magic-link store for tests and local development.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::domain::auth::{MagicLink, RedeemFailure, RedeemedLink, TokenHash};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp};
use crate::ports::{MagicLinkRepository, RedeemOutcome};

/// Links keyed by token hash behind one mutex; the lock makes redeem a test-and-set.
#[derive(Debug, Default)]
pub struct InMemoryMagicLinkRepository {
    links: Mutex<HashMap<TokenHash, MagicLink>>,
}

impl InMemoryMagicLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.links.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.links.lock().await.is_empty()
    }

    /// Stored record for `hash`, for assertions.
    pub async fn get(&self, hash: &TokenHash) -> Option<MagicLink> {
        self.links.lock().await.get(hash).cloned()
    }
}

#[async_trait]
impl MagicLinkRepository for InMemoryMagicLinkRepository {
    async fn insert(&self, link: &MagicLink) -> Result<(), DomainError> {
        let mut links = self.links.lock().await;
        if links.contains_key(&link.token_hash) {
            return Err(DomainError::new(
                ErrorCode::ConstraintViolated,
                "magic link token hash already exists",
            ));
        }
        links.insert(link.token_hash.clone(), link.clone());
        Ok(())
    }

    async fn redeem(
        &self,
        token_hash: &TokenHash,
        now: Timestamp,
    ) -> Result<RedeemOutcome, DomainError> {
        let mut links = self.links.lock().await;
        let Some(link) = links.get_mut(token_hash) else {
            return Ok(RedeemOutcome::Rejected(RedeemFailure::Invalid));
        };
        if let Err(failure) = link.check_redeemable(now) {
            return Ok(RedeemOutcome::Rejected(failure));
        }
        link.used_at = Some(now);
        Ok(RedeemOutcome::Redeemed(RedeemedLink {
            email: link.email.clone(),
            role: link.role,
        }))
    }

    async fn delete_expired_or_used(&self, now: Timestamp) -> Result<u64, DomainError> {
        let mut links = self.links.lock().await;
        let before = links.len();
        links.retain(|_, link| !link.is_removable_at(now));
        Ok((before - links.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::Role;
    use crate::domain::foundation::EmailAddress;
    use std::sync::Arc;

    fn now() -> Timestamp {
        Timestamp::from_unix_secs(1_700_000_000).unwrap()
    }

    fn issue(repo_now: Timestamp) -> (crate::domain::auth::LoginToken, MagicLink) {
        MagicLink::issue(
            EmailAddress::parse("ann@example.com").unwrap(),
            Role::Customer,
            repo_now,
        )
    }

    #[tokio::test]
    async fn redeem_once_then_used() {
        let repo = InMemoryMagicLinkRepository::new();
        let (token, link) = issue(now());
        repo.insert(&link).await.unwrap();

        let first = repo.redeem(&token.hash(), now().plus_minutes(1)).await.unwrap();
        assert!(matches!(first, RedeemOutcome::Redeemed(ref r) if r.role == Role::Customer));

        let second = repo.redeem(&token.hash(), now().plus_minutes(2)).await.unwrap();
        assert_eq!(
            second,
            RedeemOutcome::Rejected(RedeemFailure::Used { role: Role::Customer })
        );
    }

    #[tokio::test]
    async fn unknown_hash_is_invalid() {
        let repo = InMemoryMagicLinkRepository::new();
        let outcome = repo.redeem(&TokenHash::of("nope"), now()).await.unwrap();
        assert_eq!(outcome, RedeemOutcome::Rejected(RedeemFailure::Invalid));
    }

    #[tokio::test]
    async fn expired_link_is_not_marked_used() {
        let repo = InMemoryMagicLinkRepository::new();
        let (token, link) = issue(now());
        repo.insert(&link).await.unwrap();

        let outcome = repo.redeem(&token.hash(), now().plus_minutes(31)).await.unwrap();
        assert_eq!(
            outcome,
            RedeemOutcome::Rejected(RedeemFailure::Expired { role: Role::Customer })
        );
        assert!(repo.get(&token.hash()).await.unwrap().used_at.is_none());
    }

    #[tokio::test]
    async fn concurrent_redemptions_yield_one_success() {
        let repo = Arc::new(InMemoryMagicLinkRepository::new());
        let (token, link) = issue(now());
        repo.insert(&link).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let repo = repo.clone();
            let hash = token.hash();
            handles.push(tokio::spawn(async move {
                repo.redeem(&hash, now().plus_minutes(1)).await.unwrap()
            }));
        }

        let mut redeemed = 0;
        for handle in handles {
            if matches!(handle.await.unwrap(), RedeemOutcome::Redeemed(_)) {
                redeemed += 1;
            }
        }
        assert_eq!(redeemed, 1);
    }

    #[tokio::test]
    async fn cleanup_removes_expired_and_used_only() {
        let repo = InMemoryMagicLinkRepository::new();
        let (_, fresh) = issue(now());
        let (_, stale) = issue(now().minus_minutes(45));
        let (used_token, used) = issue(now());
        repo.insert(&fresh).await.unwrap();
        repo.insert(&stale).await.unwrap();
        repo.insert(&used).await.unwrap();
        repo.redeem(&used_token.hash(), now()).await.unwrap();

        assert_eq!(repo.delete_expired_or_used(now()).await.unwrap(), 2);
        assert_eq!(repo.delete_expired_or_used(now()).await.unwrap(), 0);
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn duplicate_hash_is_rejected() {
        let repo = InMemoryMagicLinkRepository::new();
        let (_, link) = issue(now());
        repo.insert(&link).await.unwrap();
        let err = repo.insert(&link).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ConstraintViolated);
    }
}
