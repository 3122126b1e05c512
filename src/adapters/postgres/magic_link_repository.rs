//! PostgreSQL implementation of MagicLinkRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::auth::{RedeemFailure, RedeemedLink, Role, TokenHash, MagicLink};
use crate::domain::foundation::{DomainError, EmailAddress, ErrorCode, Timestamp};
use crate::ports::{MagicLinkRepository, RedeemOutcome};

pub struct PostgresMagicLinkRepository {
    pool: PgPool,
}

impl PostgresMagicLinkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RedeemedRow {
    email: String,
    role: String,
}

#[derive(Debug, sqlx::FromRow)]
struct StateRow {
    role: String,
    expires_at: DateTime<Utc>,
    used_at: Option<DateTime<Utc>>,
}

fn parse_role(raw: &str) -> Result<Role, DomainError> {
    raw.parse()
        .map_err(|e| DomainError::database(format!("Invalid stored role: {}", e)))
}

#[async_trait]
impl MagicLinkRepository for PostgresMagicLinkRepository {
    async fn insert(&self, link: &MagicLink) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO magic_link_tokens (token_hash, email, role, created_at, expires_at, used_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(link.token_hash.as_str())
        .bind(link.email.as_str())
        .bind(link.role.as_str())
        .bind(link.created_at.as_datetime())
        .bind(link.expires_at.as_datetime())
        .bind(link.used_at.map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return DomainError::new(
                        ErrorCode::ConstraintViolated,
                        "magic link token hash already exists",
                    );
                }
            }
            DomainError::database(format!("Failed to store magic link: {}", e))
        })?;

        Ok(())
    }

    async fn redeem(
        &self,
        token_hash: &TokenHash,
        now: Timestamp,
    ) -> Result<RedeemOutcome, DomainError> {
        // Test-and-set: only one concurrent caller gets the row back.
        let redeemed: Option<RedeemedRow> = sqlx::query_as(
            r#"
            UPDATE magic_link_tokens
            SET used_at = $2
            WHERE token_hash = $1 AND used_at IS NULL AND expires_at > $2
            RETURNING email, role
            "#,
        )
        .bind(token_hash.as_str())
        .bind(now.as_datetime())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to redeem magic link: {}", e)))?;

        if let Some(row) = redeemed {
            return Ok(RedeemOutcome::Redeemed(RedeemedLink {
                email: EmailAddress::parse(&row.email)
                    .map_err(|e| DomainError::database(format!("Invalid stored email: {}", e)))?,
                role: parse_role(&row.role)?,
            }));
        }

        let state: Option<StateRow> = sqlx::query_as(
            "SELECT role, expires_at, used_at FROM magic_link_tokens WHERE token_hash = $1",
        )
        .bind(token_hash.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to read magic link: {}", e)))?;

        let failure = match state {
            None => RedeemFailure::Invalid,
            Some(row) => {
                let role = parse_role(&row.role)?;
                if row.used_at.is_some() {
                    RedeemFailure::Used { role }
                } else if row.expires_at <= *now.as_datetime() {
                    RedeemFailure::Expired { role }
                } else {
                    // Row changed between the two statements; treat as consumed.
                    RedeemFailure::Used { role }
                }
            }
        };
        Ok(RedeemOutcome::Rejected(failure))
    }

    async fn delete_expired_or_used(&self, now: Timestamp) -> Result<u64, DomainError> {
        let result = sqlx::query(
            "DELETE FROM magic_link_tokens WHERE used_at IS NOT NULL OR expires_at <= $1",
        )
        .bind(now.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to delete magic links: {}", e)))?;

        Ok(result.rows_affected())
    }
}
