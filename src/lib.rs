//! Next Level Web customer portal backend.
//!
//! Passwordless magic-link login, role-gated signed sessions, signed
//! unsubscribe links, and idempotent reconciliation of payment webhooks
//! against leads.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
