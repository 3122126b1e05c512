//! HTTP adapter for authentication endpoints.
//!
//! - `POST /api/auth/magic-link` - customer login link
//! - `POST /api/auth/admin/magic-link` - admin login link
//! - `GET /api/auth/verify` - redeem a login link
//! - `GET|POST /api/auth/logout` - log out

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::auth_routes;
