//! JSON error bodies and the mapping from handler errors to HTTP statuses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::application::{CheckoutError, LoginLinkError, SelectPackageError, UnsubscribeFailure};
use crate::domain::foundation::DomainError;
use crate::domain::payment::WebhookError;

/// Body of every JSON error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message; never carries secrets.
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

/// Error returned by HTTP handlers.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse::new(code, message),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Unauthorized")
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", "Server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        tracing::error!(error = %err, "Request failed on storage");
        ApiError::internal()
    }
}

impl From<LoginLinkError> for ApiError {
    fn from(err: LoginLinkError) -> Self {
        let (status, code) = match &err {
            LoginLinkError::MissingEmail => (StatusCode::BAD_REQUEST, "EMAIL_REQUIRED"),
            LoginLinkError::InvalidEmail => (StatusCode::BAD_REQUEST, "INVALID_EMAIL"),
            LoginLinkError::NoAccount => (StatusCode::NOT_FOUND, "NO_ACCOUNT"),
            LoginLinkError::NotAdmin => (StatusCode::FORBIDDEN, "NOT_ADMIN"),
            LoginLinkError::AdminNotConfigured => {
                (StatusCode::SERVICE_UNAVAILABLE, "ADMIN_NOT_CONFIGURED")
            }
            LoginLinkError::DeliveryFailed(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "EMAIL_DELIVERY_FAILED")
            }
            LoginLinkError::Storage(e) => {
                tracing::error!(error = %e, "Login link storage failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };
        ApiError::new(status, code, err.to_string())
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        let (status, code) = match &err {
            CheckoutError::PaymentsDisabled => {
                (StatusCode::SERVICE_UNAVAILABLE, "PAYMENTS_NOT_CONFIGURED")
            }
            CheckoutError::LeadNotFound => (StatusCode::NOT_FOUND, "LEAD_NOT_FOUND"),
            CheckoutError::NoDepositPrice => (StatusCode::BAD_REQUEST, "NO_DEPOSIT_PRICE"),
            CheckoutError::NothingOwed => (StatusCode::BAD_REQUEST, "NOTHING_OWED"),
            CheckoutError::Provider(_) => (StatusCode::BAD_GATEWAY, "CHECKOUT_FAILED"),
            CheckoutError::Storage(e) => {
                tracing::error!(error = %e, "Checkout storage failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };
        let message = match &err {
            CheckoutError::Provider(_) => "Checkout failed".to_string(),
            CheckoutError::Storage(_) => "Server error".to_string(),
            other => other.to_string(),
        };
        ApiError::new(status, code, message)
    }
}

impl From<SelectPackageError> for ApiError {
    fn from(err: SelectPackageError) -> Self {
        let (status, code) = match &err {
            SelectPackageError::NotSelectable(_) => (StatusCode::BAD_REQUEST, "INVALID_PACKAGE"),
            SelectPackageError::LeadNotFound => (StatusCode::NOT_FOUND, "LEAD_NOT_FOUND"),
            SelectPackageError::Storage(e) => {
                tracing::error!(error = %e, "Package selection storage failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };
        ApiError::new(status, code, err.to_string())
    }
}

impl From<WebhookError> for ApiError {
    fn from(err: WebhookError) -> Self {
        let code = match &err {
            WebhookError::NotConfigured => "WEBHOOK_NOT_CONFIGURED",
            WebhookError::MissingSignature => "MISSING_SIGNATURE",
            WebhookError::InvalidSignature
            | WebhookError::TimestampOutOfRange
            | WebhookError::InvalidTimestamp => "INVALID_SIGNATURE",
            WebhookError::ParseError(_) => "INVALID_PAYLOAD",
            WebhookError::LeadNotFound(_) | WebhookError::Database(_) => "PROCESSING_FAILED",
        };
        let message = match &err {
            WebhookError::NotConfigured => "Webhook not configured",
            WebhookError::MissingSignature => "Missing stripe-signature header",
            WebhookError::InvalidSignature
            | WebhookError::TimestampOutOfRange
            | WebhookError::InvalidTimestamp => "Invalid signature",
            WebhookError::ParseError(_) => "Invalid body",
            WebhookError::LeadNotFound(_) | WebhookError::Database(_) => "Database update failed",
        };
        ApiError::new(err.status_code(), code, message)
    }
}

impl From<UnsubscribeFailure> for ApiError {
    fn from(err: UnsubscribeFailure) -> Self {
        let (status, code) = match &err {
            UnsubscribeFailure::MissingParameters => (StatusCode::BAD_REQUEST, "MISSING_PARAMETERS"),
            UnsubscribeFailure::InvalidToken => (StatusCode::BAD_REQUEST, "INVALID_TOKEN"),
            UnsubscribeFailure::NotConfigured => {
                (StatusCode::SERVICE_UNAVAILABLE, "UNSUBSCRIBE_NOT_CONFIGURED")
            }
            UnsubscribeFailure::Storage(e) => {
                tracing::error!(error = %e, "Unsubscribe storage failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };
        ApiError::new(status, code, err.to_string())
    }
}
