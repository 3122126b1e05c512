//! Read model for dashboard and admin lead pages.

use serde::Serialize;

use crate::domain::foundation::{LeadId, Timestamp};
use crate::domain::lead::{
    format_eur, Lead, Package, PackageChange, PaymentBreakdown, PaymentStatus, PaymentType,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadView {
    pub id: LeadId,
    pub name: String,
    pub email: String,
    pub package: Option<Package>,
    pub package_label: &'static str,
    pub package_change: Option<PackageChange>,
    pub created_at: Timestamp,
    pub payment_status: PaymentStatus,
    pub total_paid_cents: i64,
    pub breakdown: PaymentBreakdown,
    pub receipts: Vec<ReceiptView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptView {
    pub payment_type: PaymentType,
    pub amount_cents: i64,
    pub amount_display: String,
    pub paid_at: Timestamp,
    pub paid_on: String,
    pub receipt_url: Option<String>,
}

impl From<&Lead> for LeadView {
    fn from(lead: &Lead) -> Self {
        Self {
            id: lead.id,
            name: lead.name.clone(),
            email: lead.email.as_str().to_string(),
            package: lead.package,
            package_label: lead.package_label(),
            package_change: lead.package_change,
            created_at: lead.created_at,
            payment_status: lead.payment.status,
            total_paid_cents: lead.payment.total_paid_cents,
            breakdown: lead.breakdown(),
            receipts: lead
                .payment
                .receipts
                .iter()
                .map(|r| ReceiptView {
                    payment_type: r.payment_type,
                    amount_cents: r.amount_cents,
                    amount_display: format_eur(r.amount_cents),
                    paid_at: r.paid_at,
                    paid_on: r.paid_at.display_date(),
                    receipt_url: r.receipt_url.clone(),
                })
                .collect(),
        }
    }
}
