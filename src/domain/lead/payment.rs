//! Payment state carried on a lead.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::package::{format_eur, Package, DEPOSIT_CENTS};
use crate::domain::foundation::{PaymentEventId, Timestamp, ValidationError};

/// Lifecycle of a lead's payments. Ordered; status only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    PaidDeposit,
    PaidFull,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::PaidDeposit => "paid_deposit",
            PaymentStatus::PaidFull => "paid_full",
        }
    }

    /// Status after a payment of `payment_type` lands.
    ///
    /// A late deposit never downgrades a fully paid lead.
    pub fn after(self, payment_type: PaymentType) -> Self {
        self.max(payment_type.resulting_status())
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unpaid" => Ok(PaymentStatus::Unpaid),
            "paid_deposit" => Ok(PaymentStatus::PaidDeposit),
            "paid_full" => Ok(PaymentStatus::PaidFull),
            other => Err(ValidationError::invalid_format(
                "payment_status",
                format!("unknown status '{other}'"),
            )),
        }
    }
}

/// What a checkout paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Deposit,
    Balance,
}

impl PaymentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Deposit => "deposit",
            PaymentType::Balance => "balance",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentType::Deposit => "Deposit",
            PaymentType::Balance => "Balance",
        }
    }

    pub fn resulting_status(&self) -> PaymentStatus {
        match self {
            PaymentType::Deposit => PaymentStatus::PaidDeposit,
            PaymentType::Balance => PaymentStatus::PaidFull,
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(PaymentType::Deposit),
            "balance" => Ok(PaymentType::Balance),
            other => Err(ValidationError::invalid_format(
                "payment_type",
                format!("unknown payment type '{other}'"),
            )),
        }
    }
}

/// One confirmed payment, as shown to the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub event_id: PaymentEventId,
    pub payment_type: PaymentType,
    pub amount_cents: i64,
    pub paid_at: Timestamp,
    pub receipt_url: Option<String>,
}

/// A confirmed payment to apply to a lead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPayment {
    pub event_id: PaymentEventId,
    pub payment_type: PaymentType,
    pub amount_cents: i64,
    pub paid_at: Timestamp,
    pub receipt_url: Option<String>,
    pub provider_customer_id: Option<String>,
}

impl RecordedPayment {
    /// Refunds and reversals never arrive through here; a negative amount is malformed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.amount_cents < 0 {
            return Err(ValidationError::invalid_format(
                "amount_cents",
                format!("negative payment amount {}", self.amount_cents),
            ));
        }
        Ok(())
    }

    pub fn receipt(&self) -> Receipt {
        Receipt {
            event_id: self.event_id.clone(),
            payment_type: self.payment_type,
            amount_cents: self.amount_cents,
            paid_at: self.paid_at,
            receipt_url: self.receipt_url.clone(),
        }
    }
}

/// Status, running total and receipts for a lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentState {
    pub status: PaymentStatus,
    pub total_paid_cents: i64,
    pub receipts: Vec<Receipt>,
}

impl PaymentState {
    pub fn unpaid() -> Self {
        Self {
            status: PaymentStatus::Unpaid,
            total_paid_cents: 0,
            receipts: Vec::new(),
        }
    }

    /// Advances status, increments the total and appends a receipt.
    ///
    /// Leaves the state untouched when the amount is negative or the total
    /// would overflow; the running total never decreases.
    pub fn apply(&mut self, payment: &RecordedPayment) -> Result<(), ValidationError> {
        payment.validate()?;
        let total = self
            .total_paid_cents
            .checked_add(payment.amount_cents)
            .ok_or_else(|| {
                ValidationError::invalid_format("total_paid_cents", "running total overflow")
            })?;

        self.status = self.status.after(payment.payment_type);
        self.total_paid_cents = total;
        self.receipts.push(payment.receipt());
        Ok(())
    }

    /// Paid amount, inferring it from status for records that predate the running total.
    pub fn effective_paid_cents(&self, package: Option<Package>) -> i64 {
        if self.total_paid_cents > 0 {
            return self.total_paid_cents;
        }
        match self.status {
            PaymentStatus::PaidFull => package.and_then(|p| p.total_cents()).unwrap_or(0),
            PaymentStatus::PaidDeposit => DEPOSIT_CENTS,
            PaymentStatus::Unpaid => 0,
        }
    }

    /// Remaining amount for the package, if it has a fixed price.
    pub fn balance_due_cents(&self, package: Option<Package>) -> Option<i64> {
        let total = package.and_then(|p| p.total_cents())?;
        Some((total - self.effective_paid_cents(package)).max(0))
    }

    pub fn breakdown(&self, package: Option<Package>) -> PaymentBreakdown {
        let paid = self.effective_paid_cents(package);
        let total = package.and_then(|p| p.total_cents());
        let balance = self.balance_due_cents(package);
        PaymentBreakdown {
            deposit_cents: DEPOSIT_CENTS,
            deposit_paid: paid >= DEPOSIT_CENTS,
            balance_cents: balance.filter(|b| *b > 0),
            balance_display: balance.map(format_eur).unwrap_or_else(|| "—".to_string()),
            balance_paid: total.is_some_and(|t| paid >= t),
            total_display: package
                .map(|p| p.total_display())
                .unwrap_or_else(|| "Quote on request".to_string()),
            total_paid_display: format_eur(paid),
        }
    }
}

impl Default for PaymentState {
    fn default() -> Self {
        Self::unpaid()
    }
}

/// Dashboard view of what has been paid and what is owed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentBreakdown {
    pub deposit_cents: i64,
    pub deposit_paid: bool,
    pub balance_cents: Option<i64>,
    pub balance_display: String,
    pub balance_paid: bool,
    pub total_display: String,
    pub total_paid_display: String,
}
