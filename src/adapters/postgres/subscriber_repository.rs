//! PostgreSQL implementation of SubscriberRepository.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, EmailAddress, Timestamp};
use crate::ports::{SubscriberRepository, SubscriptionStatus};

pub struct PostgresSubscriberRepository {
    pool: PgPool,
}

impl PostgresSubscriberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriberRepository for PostgresSubscriberRepository {
    async fn mark_unsubscribed(
        &self,
        email: &EmailAddress,
        at: Timestamp,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO email_subscribers (email, status, unsubscribed_at, updated_at)
            VALUES ($1, 'unsubscribed', $2, $2)
            ON CONFLICT (email) DO UPDATE SET
                status = 'unsubscribed',
                unsubscribed_at = EXCLUDED.unsubscribed_at,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(email.as_str())
        .bind(at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to unsubscribe: {}", e)))?;

        Ok(())
    }

    async fn status(&self, email: &EmailAddress) -> Result<Option<SubscriptionStatus>, DomainError> {
        let status: Option<String> =
            sqlx::query_scalar("SELECT status FROM email_subscribers WHERE email = $1")
                .bind(email.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| DomainError::database(format!("Failed to read subscriber: {}", e)))?;

        Ok(status.map(|s| match s.as_str() {
            "unsubscribed" => SubscriptionStatus::Unsubscribed,
            _ => SubscriptionStatus::Subscribed,
        }))
    }
}
