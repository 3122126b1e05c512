//! Stripe payment provider adapter.
//!
//! `StripePaymentAdapter` talks to the Stripe REST API with `reqwest`.
//! `MockPaymentProvider` signs and verifies webhooks locally for tests.
//!
//! # Configuration
//!
//! - `NEXTLEVEL__PAYMENT__STRIPE_API_KEY`: Stripe secret API key
//! - `NEXTLEVEL__PAYMENT__STRIPE_WEBHOOK_SECRET`: webhook signing secret (whsec_...)

mod mock_payment_provider;
mod stripe_adapter;

pub use mock_payment_provider::MockPaymentProvider;
pub use stripe_adapter::{StripeConfig, StripePaymentAdapter};
