//! Axum router configuration for the customer and admin areas.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{admin_home, customer_home, get_lead, select_package};
use crate::adapters::http::state::AppState;

/// # Routes
/// - `GET /dashboard` - customer home (customer session)
/// - `POST /api/dashboard/package` - package selection (customer session)
/// - `GET /admin` - admin home (admin session)
/// - `GET /api/admin/leads/:id` - lead view (admin session)
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(customer_home))
        .route("/api/dashboard/package", post(select_package))
        .route("/admin", get(admin_home))
        .route("/api/admin/leads/:id", get(get_lead))
}
