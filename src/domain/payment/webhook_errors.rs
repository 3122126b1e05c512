//! Webhook error types for payment webhook handling.
//!
//! Each error maps to an HTTP status that drives the processor's retry
//! behaviour: 4xx is final, 5xx is redelivered.

use axum::http::StatusCode;
use thiserror::Error;

use crate::domain::foundation::LeadId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    /// Signing secret or processor credentials are absent; every event is refused.
    #[error("Webhook not configured")]
    NotConfigured,

    #[error("Missing signature header")]
    MissingSignature,

    #[error("Invalid signature")]
    InvalidSignature,

    /// Signature older than the replay window.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Signature dated in the future beyond clock skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Lead not found: {0}")]
    LeadNotFound(LeadId),

    #[error("Database error: {0}")]
    Database(String),
}

impl WebhookError {
    /// True when the processor should redeliver the event.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WebhookError::Database(_) | WebhookError::LeadNotFound(_) | WebhookError::NotConfigured
        )
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::MissingSignature
            | WebhookError::InvalidSignature
            | WebhookError::TimestampOutOfRange
            | WebhookError::InvalidTimestamp
            | WebhookError::ParseError(_) => StatusCode::BAD_REQUEST,

            WebhookError::NotConfigured
            | WebhookError::LeadNotFound(_)
            | WebhookError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// True for failures of authenticity rather than processing.
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            WebhookError::MissingSignature
                | WebhookError::InvalidSignature
                | WebhookError::TimestampOutOfRange
                | WebhookError::InvalidTimestamp
        )
    }
}
