//! Processor-neutral payment events.

use crate::domain::foundation::{LeadId, PaymentEventId};
use crate::domain::lead::PaymentType;

/// Metadata key carrying the lead id on a checkout.
pub const METADATA_LEAD_ID: &str = "lead_id";

/// Metadata key carrying the payment type on a checkout.
pub const METADATA_PAYMENT_TYPE: &str = "payment_type";

/// Keys written by checkouts created before the snake_case keys.
pub const LEGACY_METADATA_LEAD_ID: &str = "leadId";
pub const LEGACY_METADATA_PAYMENT_TYPE: &str = "paymentType";

/// A verified event from the payment processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentEvent {
    pub id: PaymentEventId,
    /// Processor event type, as delivered.
    pub event_type: String,
    pub kind: PaymentEventKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentEventKind {
    /// A checkout finished, or its delayed payment settled.
    CheckoutCompleted(CompletedCheckout),
    /// Any event type this service does not act on.
    Other(String),
}

/// A finished hosted checkout.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompletedCheckout {
    pub session_id: String,
    pub lead_id: Option<LeadId>,
    pub payment_type: Option<PaymentType>,
    pub amount_cents: Option<i64>,
    pub currency: Option<String>,
    pub customer_id: Option<String>,
    pub customer_email: Option<String>,
    pub payment_intent_id: Option<String>,
    /// False for delayed payment methods still awaiting settlement.
    pub settled: bool,
}

impl CompletedCheckout {
    /// Lead and payment type, when the checkout was started by this service.
    pub fn target(&self) -> Option<(LeadId, PaymentType)> {
        Some((self.lead_id?, self.payment_type?))
    }
}

impl PaymentEvent {
    pub fn event_type(&self) -> &str {
        &self.event_type
    }
}
