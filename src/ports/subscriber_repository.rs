//! SubscriberRepository port - mailing list membership.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::foundation::{DomainError, EmailAddress, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Subscribed,
    Unsubscribed,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Subscribed => "subscribed",
            SubscriptionStatus::Unsubscribed => "unsubscribed",
        }
    }
}

#[async_trait]
pub trait SubscriberRepository: Send + Sync {
    /// Records the address as unsubscribed, creating the row if needed.
    async fn mark_unsubscribed(&self, email: &EmailAddress, at: Timestamp)
        -> Result<(), DomainError>;

    async fn status(&self, email: &EmailAddress) -> Result<Option<SubscriptionStatus>, DomainError>;
}
