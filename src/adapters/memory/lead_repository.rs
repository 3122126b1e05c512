//! In-memory lead store.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, EmailAddress, ErrorCode, LeadId, Timestamp};
use crate::domain::lead::{Lead, Package, RecordedPayment};
use crate::ports::LeadRepository;

#[derive(Debug, Default)]
pub struct InMemoryLeadRepository {
    leads: RwLock<HashMap<LeadId, Lead>>,
}

impl InMemoryLeadRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository seeded with `leads`.
    pub fn with_leads(leads: impl IntoIterator<Item = Lead>) -> Self {
        Self {
            leads: RwLock::new(leads.into_iter().map(|l| (l.id, l)).collect()),
        }
    }
}

#[async_trait]
impl LeadRepository for InMemoryLeadRepository {
    async fn save(&self, lead: &Lead) -> Result<(), DomainError> {
        let mut leads = self.leads.write().await;
        if leads.contains_key(&lead.id) {
            return Err(DomainError::new(
                ErrorCode::ConstraintViolated,
                format!("lead {} already exists", lead.id),
            ));
        }
        leads.insert(lead.id, lead.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: LeadId) -> Result<Option<Lead>, DomainError> {
        Ok(self.leads.read().await.get(&id).cloned())
    }

    async fn find_owned(
        &self,
        id: LeadId,
        email: &EmailAddress,
    ) -> Result<Option<Lead>, DomainError> {
        Ok(self
            .leads
            .read()
            .await
            .get(&id)
            .filter(|lead| lead.belongs_to(email))
            .cloned())
    }

    async fn find_latest_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Lead>, DomainError> {
        Ok(self
            .leads
            .read()
            .await
            .values()
            .filter(|lead| lead.belongs_to(email))
            .max_by_key(|lead| lead.created_at)
            .cloned())
    }

    async fn set_package(
        &self,
        id: LeadId,
        package: Package,
        at: Timestamp,
    ) -> Result<Lead, DomainError> {
        let mut leads = self.leads.write().await;
        let lead = leads.get_mut(&id).ok_or_else(|| {
            DomainError::new(ErrorCode::LeadNotFound, format!("lead {id} not found"))
        })?;
        lead.select_package(package, at);
        Ok(lead.clone())
    }

    async fn record_payment(
        &self,
        id: LeadId,
        payment: &RecordedPayment,
    ) -> Result<Lead, DomainError> {
        let mut leads = self.leads.write().await;
        let lead = leads.get_mut(&id).ok_or_else(|| {
            DomainError::new(ErrorCode::LeadNotFound, format!("lead {id} not found"))
        })?;
        lead.record_payment(payment)?;
        Ok(lead.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::PaymentEventId;
    use crate::domain::lead::{PackageChange, PaymentStatus, PaymentType};

    fn email(raw: &str) -> EmailAddress {
        EmailAddress::parse(raw).unwrap()
    }

    fn lead_at(raw_email: &str, secs: i64) -> Lead {
        Lead::new(
            "Ann",
            email(raw_email),
            Some(Package::Starter),
            Timestamp::from_unix_secs(secs).unwrap(),
        )
    }

    #[tokio::test]
    async fn latest_by_email_picks_newest() {
        let older = lead_at("ann@example.com", 1_000);
        let newer = lead_at("ann@example.com", 2_000);
        let other = lead_at("bob@example.com", 3_000);
        let repo = InMemoryLeadRepository::with_leads([older, newer.clone(), other]);

        let found = repo
            .find_latest_by_email(&email("ANN@example.com"))
            .await
            .unwrap();
        assert_eq!(found.map(|l| l.id), Some(newer.id));
    }

    #[tokio::test]
    async fn find_owned_checks_email() {
        let lead = lead_at("ann@example.com", 1_000);
        let repo = InMemoryLeadRepository::with_leads([lead.clone()]);

        assert!(repo
            .find_owned(lead.id, &email("ann@example.com"))
            .await
            .unwrap()
            .is_some());
        assert!(repo
            .find_owned(lead.id, &email("bob@example.com"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn set_package_persists_change() {
        let lead = lead_at("ann@example.com", 1_000);
        let repo = InMemoryLeadRepository::with_leads([lead.clone()]);
        let at = Timestamp::from_unix_secs(5_000).unwrap();

        let updated = repo.set_package(lead.id, Package::Premium, at).await.unwrap();
        assert_eq!(updated.package, Some(Package::Premium));

        let stored = repo.find_by_id(lead.id).await.unwrap().unwrap();
        assert_eq!(stored.package, Some(Package::Premium));
        assert_eq!(
            stored.package_change,
            Some(PackageChange {
                from: Some(Package::Starter),
                requested_at: at,
            })
        );
    }

    #[tokio::test]
    async fn set_package_on_missing_lead_fails() {
        let repo = InMemoryLeadRepository::new();
        let err = repo
            .set_package(LeadId::new(), Package::Growth, Timestamp::now())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::LeadNotFound);
    }

    #[tokio::test]
    async fn record_payment_on_missing_lead_fails() {
        let repo = InMemoryLeadRepository::new();
        let payment = RecordedPayment {
            event_id: PaymentEventId::new("evt_1").unwrap(),
            payment_type: PaymentType::Deposit,
            amount_cents: 20_000,
            paid_at: Timestamp::now(),
            receipt_url: None,
            provider_customer_id: None,
        };
        let err = repo.record_payment(LeadId::new(), &payment).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::LeadNotFound);
    }

    #[tokio::test]
    async fn negative_payment_is_rejected_without_change() {
        let lead = lead_at("ann@example.com", 1_000);
        let repo = InMemoryLeadRepository::with_leads([lead.clone()]);
        let payment = RecordedPayment {
            event_id: PaymentEventId::new("evt_neg").unwrap(),
            payment_type: PaymentType::Balance,
            amount_cents: -5_000,
            paid_at: Timestamp::now(),
            receipt_url: None,
            provider_customer_id: None,
        };
        let err = repo.record_payment(lead.id, &payment).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);

        let stored = repo.find_by_id(lead.id).await.unwrap().unwrap();
        assert_eq!(stored.payment, lead.payment);
    }

    #[tokio::test]
    async fn record_payment_updates_stored_lead() {
        let lead = lead_at("ann@example.com", 1_000);
        let repo = InMemoryLeadRepository::with_leads([lead.clone()]);
        let payment = RecordedPayment {
            event_id: PaymentEventId::new("evt_1").unwrap(),
            payment_type: PaymentType::Deposit,
            amount_cents: 20_000,
            paid_at: Timestamp::now(),
            receipt_url: None,
            provider_customer_id: Some("cus_1".to_string()),
        };
        repo.record_payment(lead.id, &payment).await.unwrap();

        let stored = repo.find_by_id(lead.id).await.unwrap().unwrap();
        assert_eq!(stored.payment.status, PaymentStatus::PaidDeposit);
        assert_eq!(stored.payment.total_paid_cents, 20_000);
        assert_eq!(stored.payment.receipts.len(), 1);
    }
}
