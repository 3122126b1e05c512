//! HTTP adapter for the customer dashboard and admin area.

pub mod handlers;
pub mod routes;

pub use routes::dashboard_routes;
