//! ProcessedEventStore port - idempotency markers for payment webhooks.
//!
//! The processor delivers events at least once. A marker is claimed with an
//! insert that fails on conflict, so concurrent deliveries of one event
//! elect exactly one processor. Markers are released only to compensate for
//! a failed application, which lets the processor's retry succeed.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, PaymentEventId, Timestamp};

/// Result of claiming an event id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveResult {
    /// First sighting; the caller owns processing.
    Inserted,
    /// Already processed or being processed.
    AlreadyExists,
}

#[async_trait]
pub trait ProcessedEventStore: Send + Sync {
    async fn try_insert(
        &self,
        event_id: &PaymentEventId,
        event_type: &str,
        received_at: Timestamp,
    ) -> Result<SaveResult, DomainError>;

    /// Removes a marker so a redelivery is processed again.
    async fn remove(&self, event_id: &PaymentEventId) -> Result<(), DomainError>;
}
