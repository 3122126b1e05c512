//! HTTP adapter for scheduled cleanup and unsubscribe links.

pub mod handlers;
pub mod routes;

pub use routes::maintenance_routes;
