//! HTTP adapter for payments.
//!
//! - `POST /api/dashboard/checkout` - start a hosted checkout
//! - `POST /api/webhooks/stripe` - handle Stripe webhooks

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::payment_routes;
