//! PaymentProvider port - hosted checkout, webhook verification, receipts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::{DomainError, EmailAddress, ErrorCode};
use crate::domain::payment::{CompletedCheckout, PaymentEvent, WebhookError};

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Creates a hosted checkout and returns where to send the customer.
    async fn create_checkout(&self, request: CheckoutRequest) -> Result<CheckoutSession, PaymentError>;

    /// Authenticates a raw webhook body against its signature header and
    /// parses it. Nothing in the body is trusted before this succeeds.
    fn verify_webhook(&self, payload: &[u8], signature: &str) -> Result<PaymentEvent, WebhookError>;

    /// Hosted receipt URL for a completed checkout, if the processor has one.
    async fn retrieve_receipt_url(
        &self,
        checkout: &CompletedCheckout,
    ) -> Result<Option<String>, PaymentError>;
}

/// What the customer is buying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineItem {
    /// A price configured in the processor's catalogue.
    Price { price_id: String },
    /// An ad-hoc amount in minor units.
    Amount {
        name: String,
        amount_cents: i64,
        currency: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub customer_email: EmailAddress,
    pub line_item: LineItem,
    pub success_url: String,
    pub cancel_url: String,
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

/// Processor call failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentError {
    pub code: PaymentErrorCode,
    pub message: String,
}

impl PaymentError {
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::NetworkError, message)
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::ProviderError, message)
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new(PaymentErrorCode::NotFound, format!("{} not found", resource))
    }
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PaymentError {}

impl From<PaymentError> for DomainError {
    fn from(err: PaymentError) -> Self {
        DomainError::new(ErrorCode::ExternalServiceError, err.message)
            .with_detail("payment_error", err.code.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentErrorCode {
    NetworkError,
    AuthenticationError,
    InvalidRequest,
    NotFound,
    RateLimitExceeded,
    ProviderError,
}

impl PaymentErrorCode {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentErrorCode::NetworkError | PaymentErrorCode::RateLimitExceeded
        )
    }
}

impl std::fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentErrorCode::NetworkError => "network_error",
            PaymentErrorCode::AuthenticationError => "authentication_error",
            PaymentErrorCode::InvalidRequest => "invalid_request",
            PaymentErrorCode::NotFound => "not_found",
            PaymentErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            PaymentErrorCode::ProviderError => "provider_error",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_provider_is_object_safe() {
        fn _accepts_dyn(_provider: &dyn PaymentProvider) {}
    }

    #[test]
    fn payment_error_retryable() {
        assert!(PaymentErrorCode::NetworkError.is_retryable());
        assert!(PaymentErrorCode::RateLimitExceeded.is_retryable());
        assert!(!PaymentErrorCode::InvalidRequest.is_retryable());
        assert!(!PaymentErrorCode::NotFound.is_retryable());
    }

    #[test]
    fn payment_error_display() {
        let err = PaymentError::provider("No such price");
        assert_eq!(err.to_string(), "provider_error: No such price");
    }

    #[test]
    fn payment_error_converts_to_domain_error() {
        let domain: DomainError = PaymentError::network("timeout").into();
        assert_eq!(domain.code, ErrorCode::ExternalServiceError);
        assert_eq!(
            domain.details.get("payment_error").map(String::as_str),
            Some("network_error")
        );
    }
}
