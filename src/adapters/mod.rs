//! Adapters - Implementations of port interfaces.
//!
//! - `auth` - JWT session codec
//! - `email` - Resend and recording email senders
//! - `http` - axum routes, middleware and session cookie
//! - `memory` - in-memory storage for tests and local runs
//! - `postgres` - sqlx PostgreSQL storage
//! - `rate_limiter` - in-memory fixed-window limiter
//! - `stripe` - Stripe and mock payment providers

pub mod auth;
pub mod email;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod rate_limiter;
pub mod stripe;
