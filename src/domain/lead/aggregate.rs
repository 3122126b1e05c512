//! Lead aggregate.

use serde::Serialize;

use super::{Package, PaymentBreakdown, PaymentState, RecordedPayment};
use crate::domain::foundation::{EmailAddress, LeadId, Timestamp, ValidationError};

/// A contact-form submission that may go on to buy a package.
///
/// Several leads can share an email; the most recent one is the customer's
/// current engagement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lead {
    pub id: LeadId,
    pub name: String,
    pub email: EmailAddress,
    pub package: Option<Package>,
    pub created_at: Timestamp,
    pub payment: PaymentState,
    pub provider_customer_id: Option<String>,
    pub package_change: Option<PackageChange>,
}

/// Last package switch a customer asked for from the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageChange {
    pub from: Option<Package>,
    pub requested_at: Timestamp,
}

impl Lead {
    /// New lead with no payments.
    pub fn new(
        name: impl Into<String>,
        email: EmailAddress,
        package: Option<Package>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: LeadId::new(),
            name: name.into(),
            email,
            package,
            created_at,
            payment: PaymentState::unpaid(),
            provider_customer_id: None,
            package_change: None,
        }
    }

    pub fn belongs_to(&self, email: &EmailAddress) -> bool {
        &self.email == email
    }

    pub fn package_label(&self) -> &'static str {
        self.package.map(|p| p.label()).unwrap_or("Custom")
    }

    pub fn breakdown(&self) -> PaymentBreakdown {
        self.payment.breakdown(self.package)
    }

    pub fn balance_due_cents(&self) -> Option<i64> {
        self.payment.balance_due_cents(self.package)
    }

    /// Switches to `package`, noting the previous choice when it differs.
    /// Returns whether the package changed.
    pub fn select_package(&mut self, package: Package, at: Timestamp) -> bool {
        if self.package == Some(package) {
            return false;
        }
        self.package_change = Some(PackageChange {
            from: self.package,
            requested_at: at,
        });
        self.package = Some(package);
        true
    }

    /// Applies a confirmed payment; first processor customer id wins.
    pub fn record_payment(&mut self, payment: &RecordedPayment) -> Result<(), ValidationError> {
        self.payment.apply(payment)?;
        if self.provider_customer_id.is_none() {
            self.provider_customer_id = payment.provider_customer_id.clone();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::PaymentEventId;
    use crate::domain::lead::{PaymentStatus, PaymentType};

    fn lead() -> Lead {
        Lead::new(
            "Ann",
            EmailAddress::parse("ann@example.com").unwrap(),
            Some(Package::Growth),
            Timestamp::now(),
        )
    }

    #[test]
    fn new_lead_is_unpaid() {
        let lead = lead();
        assert_eq!(lead.payment.status, PaymentStatus::Unpaid);
        assert_eq!(lead.payment.total_paid_cents, 0);
        assert!(lead.payment.receipts.is_empty());
        assert_eq!(lead.balance_due_cents(), Some(120_000));
    }

    #[test]
    fn record_payment_updates_state_and_customer() {
        let mut lead = lead();
        lead.record_payment(&RecordedPayment {
            event_id: PaymentEventId::new("evt_1").unwrap(),
            payment_type: PaymentType::Deposit,
            amount_cents: 20_000,
            paid_at: Timestamp::now(),
            receipt_url: Some("https://pay.stripe.com/receipts/r1".to_string()),
            provider_customer_id: Some("cus_1".to_string()),
        })
        .unwrap();

        assert_eq!(lead.payment.status, PaymentStatus::PaidDeposit);
        assert_eq!(lead.balance_due_cents(), Some(100_000));
        assert_eq!(lead.provider_customer_id.as_deref(), Some("cus_1"));
    }

    #[test]
    fn belongs_to_compares_normalized_email() {
        let lead = lead();
        assert!(lead.belongs_to(&EmailAddress::parse("ANN@example.com").unwrap()));
        assert!(!lead.belongs_to(&EmailAddress::parse("bob@example.com").unwrap()));
    }

    #[test]
    fn select_package_records_previous_choice() {
        let mut lead = lead();
        let at = Timestamp::from_unix_secs(1_800_000_000).unwrap();

        assert!(lead.select_package(Package::Premium, at));
        assert_eq!(lead.package, Some(Package::Premium));
        assert_eq!(
            lead.package_change,
            Some(PackageChange {
                from: Some(Package::Growth),
                requested_at: at,
            })
        );
    }

    #[test]
    fn reselecting_same_package_is_not_a_change() {
        let mut lead = lead();
        assert!(!lead.select_package(Package::Growth, Timestamp::now()));
        assert_eq!(lead.package_change, None);
    }

    #[test]
    fn first_selection_changes_from_none() {
        let mut lead = lead();
        lead.package = None;
        assert!(lead.select_package(Package::Starter, Timestamp::now()));
        assert_eq!(lead.package_change.map(|c| c.from), Some(None));
    }

    #[test]
    fn package_label_defaults_to_custom() {
        let mut lead = lead();
        assert_eq!(lead.package_label(), "Growth");
        lead.package = None;
        assert_eq!(lead.package_label(), "Custom");
    }
}
