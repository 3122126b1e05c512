//! Payment handlers: checkout creation and webhook reconciliation.

mod create_checkout;
mod handle_payment_webhook;

pub use create_checkout::{
    CheckoutError, CheckoutSettings, CreateCheckoutCommand, CreateCheckoutHandler,
    CreateCheckoutResult,
};
pub use handle_payment_webhook::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, HandlePaymentWebhookResult,
};
