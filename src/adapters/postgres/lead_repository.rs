//! PostgreSQL implementation of LeadRepository.
//!
//! Leads live in `leads`; each confirmed payment adds a row to
//! `lead_payment_receipts`. The payment mutation runs in one transaction
//! with an in-place increment so concurrent events cannot lose an amount.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::foundation::{
    DomainError, EmailAddress, ErrorCode, LeadId, PaymentEventId, Timestamp,
};
use crate::domain::lead::{
    Lead, Package, PackageChange, PaymentState, PaymentStatus, Receipt, RecordedPayment,
};
use crate::ports::LeadRepository;

pub struct PostgresLeadRepository {
    pool: PgPool,
}

impl PostgresLeadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_receipts(&self, lead_id: Uuid) -> Result<Vec<Receipt>, DomainError> {
        let rows: Vec<ReceiptRow> = sqlx::query_as(
            r#"
            SELECT event_id, payment_type, amount_cents, paid_at, receipt_url
            FROM lead_payment_receipts
            WHERE lead_id = $1
            ORDER BY paid_at ASC, event_id ASC
            "#,
        )
        .bind(lead_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to load receipts: {}", e)))?;

        rows.into_iter().map(Receipt::try_from).collect()
    }

    async fn hydrate(&self, row: Option<LeadRow>) -> Result<Option<Lead>, DomainError> {
        let Some(row) = row else {
            return Ok(None);
        };
        let receipts = self.load_receipts(row.id).await?;
        row.into_lead(receipts).map(Some)
    }
}

/// Database row representation of a lead.
#[derive(Debug, sqlx::FromRow)]
struct LeadRow {
    id: Uuid,
    name: String,
    email: String,
    package: Option<String>,
    created_at: DateTime<Utc>,
    payment_status: String,
    total_paid_cents: i64,
    stripe_customer_id: Option<String>,
    package_change_from: Option<String>,
    package_change_requested_at: Option<DateTime<Utc>>,
}

impl LeadRow {
    fn into_lead(self, receipts: Vec<Receipt>) -> Result<Lead, DomainError> {
        let package_change = match self.package_change_requested_at {
            Some(at) => Some(PackageChange {
                from: parse_package(self.package_change_from.as_deref())?,
                requested_at: Timestamp::from_datetime(at),
            }),
            None => None,
        };

        Ok(Lead {
            id: LeadId::from_uuid(self.id),
            name: self.name,
            email: EmailAddress::parse(&self.email).map_err(corrupt)?,
            package: parse_package(self.package.as_deref())?,
            created_at: Timestamp::from_datetime(self.created_at),
            payment: PaymentState {
                status: self.payment_status.parse::<PaymentStatus>().map_err(corrupt)?,
                total_paid_cents: self.total_paid_cents,
                receipts,
            },
            provider_customer_id: self.stripe_customer_id,
            package_change,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ReceiptRow {
    event_id: String,
    payment_type: String,
    amount_cents: i64,
    paid_at: DateTime<Utc>,
    receipt_url: Option<String>,
}

impl TryFrom<ReceiptRow> for Receipt {
    type Error = DomainError;

    fn try_from(row: ReceiptRow) -> Result<Self, Self::Error> {
        Ok(Receipt {
            event_id: PaymentEventId::new(row.event_id).map_err(corrupt)?,
            payment_type: row.payment_type.parse().map_err(corrupt)?,
            amount_cents: row.amount_cents,
            paid_at: Timestamp::from_datetime(row.paid_at),
            receipt_url: row.receipt_url,
        })
    }
}

fn parse_package(raw: Option<&str>) -> Result<Option<Package>, DomainError> {
    raw.map(str::parse::<Package>).transpose().map_err(corrupt)
}

fn corrupt(err: impl std::fmt::Display) -> DomainError {
    DomainError::database(format!("Invalid stored value: {}", err))
}

const LEAD_COLUMNS: &str = "id, name, email, package, created_at, payment_status, \
    total_paid_cents, stripe_customer_id, package_change_from, package_change_requested_at";

async fn apply_payment(
    tx: &mut Transaction<'_, Postgres>,
    id: LeadId,
    payment: &RecordedPayment,
) -> Result<bool, sqlx::Error> {
    // Status only moves forward; paid_full is terminal.
    let updated = sqlx::query(
        r#"
        UPDATE leads SET
            payment_status = CASE
                WHEN payment_status = 'paid_full' THEN 'paid_full'
                ELSE $2
            END,
            total_paid_cents = total_paid_cents + $3,
            stripe_customer_id = COALESCE(stripe_customer_id, $4)
        WHERE id = $1
        "#,
    )
    .bind(id.as_uuid())
    .bind(payment.payment_type.resulting_status().as_str())
    .bind(payment.amount_cents)
    .bind(&payment.provider_customer_id)
    .execute(&mut **tx)
    .await?;

    if updated.rows_affected() == 0 {
        return Ok(false);
    }

    sqlx::query(
        r#"
        INSERT INTO lead_payment_receipts (
            event_id, lead_id, payment_type, amount_cents, paid_at, receipt_url
        ) VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (event_id) DO NOTHING
        "#,
    )
    .bind(payment.event_id.as_str())
    .bind(id.as_uuid())
    .bind(payment.payment_type.as_str())
    .bind(payment.amount_cents)
    .bind(payment.paid_at.as_datetime())
    .bind(&payment.receipt_url)
    .execute(&mut **tx)
    .await?;

    Ok(true)
}

#[async_trait]
impl LeadRepository for PostgresLeadRepository {
    async fn save(&self, lead: &Lead) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO leads (
                id, name, email, package, created_at,
                payment_status, total_paid_cents, stripe_customer_id,
                package_change_from, package_change_requested_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(lead.id.as_uuid())
        .bind(&lead.name)
        .bind(lead.email.as_str())
        .bind(lead.package.map(|p| p.as_str()))
        .bind(lead.created_at.as_datetime())
        .bind(lead.payment.status.as_str())
        .bind(lead.payment.total_paid_cents)
        .bind(&lead.provider_customer_id)
        .bind(lead.package_change.and_then(|c| c.from).map(|p| p.as_str()))
        .bind(lead.package_change.map(|c| *c.requested_at.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some("leads_pkey") {
                    return DomainError::new(
                        ErrorCode::ConstraintViolated,
                        format!("lead {} already exists", lead.id),
                    );
                }
            }
            DomainError::database(format!("Failed to save lead: {}", e))
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: LeadId) -> Result<Option<Lead>, DomainError> {
        let row: Option<LeadRow> =
            sqlx::query_as(&format!("SELECT {} FROM leads WHERE id = $1", LEAD_COLUMNS))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| DomainError::database(format!("Failed to find lead: {}", e)))?;

        self.hydrate(row).await
    }

    async fn find_owned(
        &self,
        id: LeadId,
        email: &EmailAddress,
    ) -> Result<Option<Lead>, DomainError> {
        let row: Option<LeadRow> = sqlx::query_as(&format!(
            "SELECT {} FROM leads WHERE id = $1 AND email = $2",
            LEAD_COLUMNS
        ))
        .bind(id.as_uuid())
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to find lead: {}", e)))?;

        self.hydrate(row).await
    }

    async fn find_latest_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Lead>, DomainError> {
        let row: Option<LeadRow> = sqlx::query_as(&format!(
            "SELECT {} FROM leads WHERE email = $1 ORDER BY created_at DESC LIMIT 1",
            LEAD_COLUMNS
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to find lead: {}", e)))?;

        self.hydrate(row).await
    }

    async fn set_package(
        &self,
        id: LeadId,
        package: Package,
        at: Timestamp,
    ) -> Result<Lead, DomainError> {
        // Right-hand sides all read the pre-update row.
        let updated = sqlx::query(
            r#"
            UPDATE leads SET
                package_change_from = CASE
                    WHEN package IS DISTINCT FROM $2 THEN package
                    ELSE package_change_from
                END,
                package_change_requested_at = CASE
                    WHEN package IS DISTINCT FROM $2 THEN $3
                    ELSE package_change_requested_at
                END,
                package = $2
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(package.as_str())
        .bind(at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to set package: {}", e)))?;

        if updated.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::LeadNotFound,
                format!("lead {id} not found"),
            ));
        }

        tracing::info!(lead_id = %id, package = %package, "Package selected");

        self.find_by_id(id).await?.ok_or_else(|| {
            DomainError::new(ErrorCode::LeadNotFound, format!("lead {id} not found"))
        })
    }

    async fn record_payment(
        &self,
        id: LeadId,
        payment: &RecordedPayment,
    ) -> Result<Lead, DomainError> {
        payment.validate()?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database(format!("Failed to begin transaction: {}", e)))?;

        let found = apply_payment(&mut tx, id, payment)
            .await
            .map_err(|e| DomainError::database(format!("Failed to record payment: {}", e)))?;

        if !found {
            tx.rollback().await.ok();
            return Err(DomainError::new(
                ErrorCode::LeadNotFound,
                format!("lead {id} not found"),
            ));
        }

        tx.commit()
            .await
            .map_err(|e| DomainError::database(format!("Failed to commit payment: {}", e)))?;

        tracing::info!(
            lead_id = %id,
            event_id = %payment.event_id,
            payment_type = %payment.payment_type,
            amount_cents = payment.amount_cents,
            "Recorded payment"
        );

        self.find_by_id(id).await?.ok_or_else(|| {
            DomainError::new(ErrorCode::LeadNotFound, format!("lead {id} not found"))
        })
    }
}
