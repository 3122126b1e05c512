//! HTTP adapters - the axum surface.
//!
//! Each area has its own module with handlers and routes; `router` merges
//! them and applies the session middleware and page gate.

pub mod auth;
pub mod dashboard;
pub mod error;
pub mod maintenance;
pub mod middleware;
pub mod payment;
pub mod router;
pub mod session_cookie;
pub mod state;

pub use error::{ApiError, ErrorResponse};
pub use router::app_router;
pub use session_cookie::{SessionCookie, SESSION_COOKIE_NAME};
pub use state::{AppState, HttpSettings};
