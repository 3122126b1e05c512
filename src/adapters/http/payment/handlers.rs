//! HTTP handlers for checkout and the payment webhook.

use axum::body::Bytes;
use axum::extract::rejection::FormRejection;
use axum::extract::{Form, Json, State};
use axum::http::HeaderMap;

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::CustomerSession;
use crate::adapters::http::state::AppState;
use crate::application::{CreateCheckoutCommand, HandlePaymentWebhookCommand};
use crate::domain::lead::PaymentType;

use super::dto::{CheckoutForm, CheckoutResponse, WebhookAck};

pub const STRIPE_SIGNATURE_HEADER: &str = "stripe-signature";

/// POST /api/webhooks/stripe - signed processor events
///
/// The raw body is passed through untouched; the signature covers its bytes.
pub async fn handle_stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, ApiError> {
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let result = state
        .webhook_handler()
        .handle(HandlePaymentWebhookCommand {
            payload: body.to_vec(),
            signature,
        })
        .await;

    match result {
        Ok(outcome) => {
            tracing::debug!(?outcome, "Webhook acknowledged");
            Ok(Json(WebhookAck { received: true }))
        }
        Err(e) if e.is_verification_failure() => {
            tracing::warn!(error = %e, "Webhook rejected");
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /api/dashboard/checkout - start a deposit or balance checkout
pub async fn create_checkout(
    State(state): State<AppState>,
    CustomerSession(session): CustomerSession,
    form: Result<Form<CheckoutForm>, FormRejection>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let payment_type = form
        .ok()
        .and_then(|Form(f)| f.payment_type)
        .and_then(|t| t.parse::<PaymentType>().ok())
        .ok_or_else(|| ApiError::bad_request("Invalid type. Use deposit or balance."))?;

    let result = state
        .checkout_handler()
        .handle(CreateCheckoutCommand {
            session,
            payment_type,
        })
        .await?;

    Ok(Json(CheckoutResponse {
        redirect_url: result.redirect_url,
    }))
}
