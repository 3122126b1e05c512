//! Domain layer: pure types and rules with no I/O.

pub mod auth;
pub mod foundation;
pub mod lead;
pub mod payment;
