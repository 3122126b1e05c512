//! Foundation module - Shared domain primitives.
//!
//! Identifiers, timestamps, the normalized email address, and the error types
//! used across the portal domain.

pub mod crypto;
mod email;
mod errors;
mod ids;
mod timestamp;

pub use email::{normalize as normalize_email, EmailAddress};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{LeadId, PaymentEventId};
pub use timestamp::Timestamp;
