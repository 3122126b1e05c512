//! Full application router.

use axum::{middleware, Router};

use super::auth::auth_routes;
use super::dashboard::dashboard_routes;
use super::maintenance::maintenance_routes;
use super::middleware::{page_gate, session_middleware};
use super::payment::payment_routes;
use super::state::AppState;

/// Every route with the session middleware and page gate applied.
///
/// The session layer is outermost so the gate sees verified claims.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .merge(auth_routes(&state))
        .merge(payment_routes())
        .merge(dashboard_routes())
        .merge(maintenance_routes())
        .layer(middleware::from_fn(page_gate))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        .with_state(state)
}
