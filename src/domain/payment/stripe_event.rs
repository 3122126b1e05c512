//! Stripe webhook event payloads.
//!
//! Only the fields this service reads are captured; everything else in
//! Stripe's schema is ignored.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::event::{
    CompletedCheckout, PaymentEvent, PaymentEventKind, LEGACY_METADATA_LEAD_ID,
    LEGACY_METADATA_PAYMENT_TYPE, METADATA_LEAD_ID, METADATA_PAYMENT_TYPE,
};
use super::webhook_errors::WebhookError;
use crate::domain::foundation::PaymentEventId;

pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

/// Sent once a delayed payment method (SEPA debit, bank transfer) settles a
/// checkout that completed unpaid.
pub const CHECKOUT_SESSION_ASYNC_PAYMENT_SUCCEEDED: &str =
    "checkout.session.async_payment_succeeded";

/// Stripe webhook event envelope.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEvent {
    /// `evt_...`
    pub id: String,

    #[serde(rename = "type")]
    pub event_type: String,

    /// Unix seconds.
    pub created: i64,

    pub data: StripeEventData,

    #[serde(default)]
    pub livemode: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    /// Polymorphic on the event type.
    pub object: serde_json::Value,
}

/// `checkout.session` object.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CheckoutSessionObject {
    pub id: String,
    pub customer: Option<String>,
    pub customer_email: Option<String>,
    pub customer_details: Option<CustomerDetails>,
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub payment_intent: Option<String>,
    pub payment_status: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl CheckoutSessionObject {
    fn metadata_value(&self, key: &str, legacy_key: &str) -> Option<&str> {
        self.metadata
            .get(key)
            .or_else(|| self.metadata.get(legacy_key))
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CustomerDetails {
    pub email: Option<String>,
}

impl StripeEvent {
    pub fn deserialize_object<T: serde::de::DeserializeOwned>(
        &self,
    ) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.object.clone())
    }

    /// Converts to a processor-neutral event.
    ///
    /// Checkout metadata that does not parse is treated as absent: the
    /// checkout was not started by this service.
    pub fn into_payment_event(self) -> Result<PaymentEvent, WebhookError> {
        let id = PaymentEventId::new(self.id.clone())
            .map_err(|e| WebhookError::ParseError(e.to_string()))?;

        let async_settlement = match self.event_type.as_str() {
            CHECKOUT_SESSION_COMPLETED => Some(false),
            CHECKOUT_SESSION_ASYNC_PAYMENT_SUCCEEDED => Some(true),
            _ => None,
        };
        let Some(async_settlement) = async_settlement else {
            return Ok(PaymentEvent {
                id,
                kind: PaymentEventKind::Other(self.event_type.clone()),
                event_type: self.event_type,
            });
        };

        let session: CheckoutSessionObject = self
            .deserialize_object()
            .map_err(|e| WebhookError::ParseError(e.to_string()))?;

        let checkout = CompletedCheckout {
            lead_id: session
                .metadata_value(METADATA_LEAD_ID, LEGACY_METADATA_LEAD_ID)
                .and_then(|v| v.parse().ok()),
            payment_type: session
                .metadata_value(METADATA_PAYMENT_TYPE, LEGACY_METADATA_PAYMENT_TYPE)
                .and_then(|v| v.parse().ok()),
            amount_cents: session.amount_total,
            currency: session.currency,
            customer_id: session.customer,
            customer_email: session
                .customer_details
                .and_then(|d| d.email)
                .or(session.customer_email),
            payment_intent_id: session.payment_intent,
            settled: async_settlement || session.payment_status.as_deref() != Some("unpaid"),
            session_id: session.id,
        };

        Ok(PaymentEvent {
            id,
            event_type: self.event_type,
            kind: PaymentEventKind::CheckoutCompleted(checkout),
        })
    }
}

/// Builder for test events.
#[cfg(test)]
pub struct StripeEventBuilder {
    id: String,
    event_type: String,
    created: i64,
    object: serde_json::Value,
}

#[cfg(test)]
impl Default for StripeEventBuilder {
    fn default() -> Self {
        Self {
            id: "evt_test_123".to_string(),
            event_type: CHECKOUT_SESSION_COMPLETED.to_string(),
            created: chrono::Utc::now().timestamp(),
            object: serde_json::json!({ "id": "cs_test_1" }),
        }
    }
}

#[cfg(test)]
impl StripeEventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn object(mut self, object: serde_json::Value) -> Self {
        self.object = object;
        self
    }

    pub fn build(self) -> StripeEvent {
        StripeEvent {
            id: self.id,
            event_type: self.event_type,
            created: self.created,
            data: StripeEventData {
                object: self.object,
            },
            livemode: false,
        }
    }
}
