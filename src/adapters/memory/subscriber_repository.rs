//! In-memory mailing list.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, EmailAddress, Timestamp};
use crate::ports::{SubscriberRepository, SubscriptionStatus};

#[derive(Debug, Default)]
pub struct InMemorySubscriberRepository {
    subscribers: RwLock<HashMap<EmailAddress, (SubscriptionStatus, Option<Timestamp>)>>,
}

impl InMemorySubscriberRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn subscribe(&self, email: EmailAddress) {
        self.subscribers
            .write()
            .await
            .insert(email, (SubscriptionStatus::Subscribed, None));
    }
}

#[async_trait]
impl SubscriberRepository for InMemorySubscriberRepository {
    async fn mark_unsubscribed(
        &self,
        email: &EmailAddress,
        at: Timestamp,
    ) -> Result<(), DomainError> {
        self.subscribers
            .write()
            .await
            .insert(email.clone(), (SubscriptionStatus::Unsubscribed, Some(at)));
        Ok(())
    }

    async fn status(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<SubscriptionStatus>, DomainError> {
        Ok(self.subscribers.read().await.get(email).map(|(s, _)| *s))
    }
}
