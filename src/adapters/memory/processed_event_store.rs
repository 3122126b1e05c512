//! In-memory payment event markers.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::domain::foundation::{DomainError, PaymentEventId, Timestamp};
use crate::ports::{ProcessedEventStore, SaveResult};

#[derive(Debug, Default)]
pub struct InMemoryProcessedEventStore {
    events: Mutex<HashMap<PaymentEventId, (String, Timestamp)>>,
}

impl InMemoryProcessedEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, event_id: &PaymentEventId) -> bool {
        self.events.lock().await.contains_key(event_id)
    }
}

#[async_trait]
impl ProcessedEventStore for InMemoryProcessedEventStore {
    async fn try_insert(
        &self,
        event_id: &PaymentEventId,
        event_type: &str,
        received_at: Timestamp,
    ) -> Result<SaveResult, DomainError> {
        let mut events = self.events.lock().await;
        if events.contains_key(event_id) {
            return Ok(SaveResult::AlreadyExists);
        }
        events.insert(event_id.clone(), (event_type.to_string(), received_at));
        Ok(SaveResult::Inserted)
    }

    async fn remove(&self, event_id: &PaymentEventId) -> Result<(), DomainError> {
        self.events.lock().await.remove(event_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_insert_reports_existing() {
        let store = InMemoryProcessedEventStore::new();
        let id = PaymentEventId::new("evt_123").unwrap();

        assert_eq!(
            store.try_insert(&id, "checkout.session.completed", Timestamp::now()).await.unwrap(),
            SaveResult::Inserted
        );
        assert_eq!(
            store.try_insert(&id, "checkout.session.completed", Timestamp::now()).await.unwrap(),
            SaveResult::AlreadyExists
        );
    }

    #[tokio::test]
    async fn remove_allows_reinsert() {
        let store = InMemoryProcessedEventStore::new();
        let id = PaymentEventId::new("evt_123").unwrap();
        store.try_insert(&id, "x", Timestamp::now()).await.unwrap();
        store.remove(&id).await.unwrap();

        assert!(!store.contains(&id).await);
        assert_eq!(
            store.try_insert(&id, "x", Timestamp::now()).await.unwrap(),
            SaveResult::Inserted
        );
    }
}
