//! Application handlers.
//!
//! One command or query handler per boundary operation.

pub mod auth;
pub mod lead;
pub mod payment;
pub mod subscriber;
