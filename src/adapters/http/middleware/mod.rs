//! HTTP middleware for axum.
//!
//! - `session` - session cookie verification, page gate and role extractors
//! - `rate_limit` - per-IP limit on login-link requests

pub mod rate_limit;
pub mod session;

pub use rate_limit::{client_ip, login_link_rate_limit, RateLimiterState};
pub use session::{page_gate, required_role, session_middleware, AdminSession, CustomerSession};
