//! PostgreSQL implementation of ProcessedEventStore.
//!
//! The primary key on `event_id` makes the insert the idempotency gate.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, PaymentEventId, Timestamp};
use crate::ports::{ProcessedEventStore, SaveResult};

pub struct PostgresProcessedEventStore {
    pool: PgPool,
}

impl PostgresProcessedEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProcessedEventStore for PostgresProcessedEventStore {
    async fn try_insert(
        &self,
        event_id: &PaymentEventId,
        event_type: &str,
        received_at: Timestamp,
    ) -> Result<SaveResult, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO processed_payment_events (event_id, event_type, received_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (event_id) DO NOTHING
            "#,
        )
        .bind(event_id.as_str())
        .bind(event_type)
        .bind(received_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to record event: {}", e)))?;

        if result.rows_affected() == 0 {
            Ok(SaveResult::AlreadyExists)
        } else {
            Ok(SaveResult::Inserted)
        }
    }

    async fn remove(&self, event_id: &PaymentEventId) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM processed_payment_events WHERE event_id = $1")
            .bind(event_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to release event: {}", e)))?;
        Ok(())
    }
}
