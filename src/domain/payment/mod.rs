//! Payment processor events, webhook verification and receipt content.

mod event;
mod receipt_notice;
mod stripe_event;
mod webhook_errors;
mod webhook_verifier;

pub use event::{
    CompletedCheckout, PaymentEvent, PaymentEventKind, METADATA_LEAD_ID, METADATA_PAYMENT_TYPE,
};
pub use receipt_notice::ReceiptNotice;
pub use stripe_event::{
    CheckoutSessionObject, CustomerDetails, StripeEvent, StripeEventData,
    CHECKOUT_SESSION_ASYNC_PAYMENT_SUCCEEDED, CHECKOUT_SESSION_COMPLETED,
};
#[cfg(test)]
pub use stripe_event::StripeEventBuilder;
pub use webhook_errors::WebhookError;
pub use webhook_verifier::{sign_payload, SignatureHeader, StripeWebhookVerifier};
