//! Axum router configuration for maintenance endpoints.

use axum::{routing::get, Router};

use super::handlers::{cleanup_magic_links, unsubscribe};
use crate::adapters::http::state::AppState;

/// # Routes
/// - `GET /api/cron/cleanup-magic-links` - bearer-protected cleanup
/// - `GET /unsubscribe` - signed unsubscribe link
pub fn maintenance_routes() -> Router<AppState> {
    Router::new()
        .route("/api/cron/cleanup-magic-links", get(cleanup_magic_links))
        .route("/unsubscribe", get(unsubscribe))
}
