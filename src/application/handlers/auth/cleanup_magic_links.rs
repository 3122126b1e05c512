//! CleanupMagicLinksHandler - removes expired and used login links.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::ports::MagicLinkRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupMagicLinksResult {
    pub deleted: u64,
}

/// Safe to run repeatedly; runs on a timer and from the cron endpoint.
pub struct CleanupMagicLinksHandler {
    links: Arc<dyn MagicLinkRepository>,
}

impl CleanupMagicLinksHandler {
    pub fn new(links: Arc<dyn MagicLinkRepository>) -> Self {
        Self { links }
    }

    pub async fn handle(&self) -> Result<CleanupMagicLinksResult, DomainError> {
        self.handle_at(Timestamp::now()).await
    }

    pub async fn handle_at(&self, now: Timestamp) -> Result<CleanupMagicLinksResult, DomainError> {
        let deleted = self.links.delete_expired_or_used(now).await?;
        if deleted > 0 {
            tracing::info!(deleted, "Removed stale login links");
        }
        Ok(CleanupMagicLinksResult { deleted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryMagicLinkRepository;
    use crate::domain::auth::{MagicLink, Role, MAGIC_LINK_TTL_MINUTES};
    use crate::domain::foundation::EmailAddress;

    fn now() -> Timestamp {
        Timestamp::from_unix_secs(1_700_000_000).unwrap()
    }

    #[tokio::test]
    async fn second_run_deletes_nothing() {
        let links = Arc::new(InMemoryMagicLinkRepository::new());
        let email = EmailAddress::parse("ann@example.com").unwrap();
        let (_, stale) = MagicLink::issue(email.clone(), Role::Customer, now());
        let (_, fresh) = MagicLink::issue(email, Role::Customer, now().plus_minutes(20));
        links.insert(&stale).await.unwrap();
        links.insert(&fresh).await.unwrap();

        let handler = CleanupMagicLinksHandler::new(links.clone());
        let later = now().plus_minutes(MAGIC_LINK_TTL_MINUTES + 1);

        assert_eq!(handler.handle_at(later).await.unwrap().deleted, 1);
        assert_eq!(handler.handle_at(later).await.unwrap().deleted, 0);
        assert_eq!(links.len().await, 1);
    }
}
