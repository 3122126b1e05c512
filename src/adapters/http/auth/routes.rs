//! Axum router configuration for auth endpoints.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use super::handlers::{logout, request_admin_link, request_customer_link, verify_login_link};
use crate::adapters::http::middleware::login_link_rate_limit;
use crate::adapters::http::state::AppState;

/// Auth routes, mounted at the root.
///
/// # Routes
/// - `POST /api/auth/magic-link` - customer login link (rate limited)
/// - `POST /api/auth/admin/magic-link` - admin login link (rate limited)
/// - `GET /api/auth/verify` - redeem a login link
/// - `GET|POST /api/auth/logout` - clear the session
pub fn auth_routes(state: &AppState) -> Router<AppState> {
    let login_links = Router::new()
        .route("/api/auth/magic-link", post(request_customer_link))
        .route("/api/auth/admin/magic-link", post(request_admin_link))
        .route_layer(middleware::from_fn_with_state(
            state.rate_limiter.clone(),
            login_link_rate_limit,
        ));

    Router::new()
        .route("/api/auth/verify", get(verify_login_link))
        .route("/api/auth/logout", get(logout).post(logout))
        .merge(login_links)
}
