//! Request and response bodies for payment endpoints.

use serde::{Deserialize, Serialize};

/// Form body of `POST /api/dashboard/checkout`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutForm {
    /// `deposit` or `balance`.
    #[serde(rename = "type", default)]
    pub payment_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub redirect_url: String,
}

/// Acknowledgement returned for every accepted webhook delivery,
/// including duplicates and ignored event types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookAck {
    pub received: bool,
}
