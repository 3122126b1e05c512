//! Axum router configuration for payment endpoints.

use axum::{routing::post, Router};

use super::handlers::{create_checkout, handle_stripe_webhook};
use crate::adapters::http::state::AppState;

/// # Routes
/// - `POST /api/dashboard/checkout` - customer checkout (session required)
/// - `POST /api/webhooks/stripe` - processor webhook (signature verified)
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/api/dashboard/checkout", post(create_checkout))
        .route("/api/webhooks/stripe", post(handle_stripe_webhook))
}
