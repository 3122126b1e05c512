//! Stripe payment provider adapter.
//!
//! Creates hosted checkout sessions, looks up receipt URLs and verifies
//! webhook deliveries.
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new(api_key, webhook_secret);
//! let adapter = StripePaymentAdapter::new(config);
//! ```

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::config::PaymentConfig;
use crate::domain::payment::{
    CompletedCheckout, PaymentEvent, StripeWebhookVerifier, WebhookError,
};
use crate::ports::{
    CheckoutRequest, CheckoutSession, LineItem, PaymentError, PaymentErrorCode, PaymentProvider,
};

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Webhook signing secret (whsec_...).
    webhook_secret: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,

    /// Reject test-mode events.
    require_livemode: bool,
}

impl StripeConfig {
    pub fn new(api_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            webhook_secret: SecretString::new(webhook_secret.into()),
            api_base_url: "https://api.stripe.com".to_string(),
            require_livemode: false,
        }
    }

    /// `None` unless both the API key and the webhook secret are set.
    pub fn from_payment_config(config: &PaymentConfig) -> Option<Self> {
        let (key, secret) = config.credentials()?;
        Some(Self::new(key, secret).with_require_livemode(!config.is_test_mode()))
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_require_livemode(mut self, require: bool) -> Self {
        self.require_livemode = require;
        self
    }
}

pub struct StripePaymentAdapter {
    config: StripeConfig,
    verifier: StripeWebhookVerifier,
    http_client: reqwest::Client,
}

impl StripePaymentAdapter {
    pub fn new(config: StripeConfig) -> Self {
        let verifier = StripeWebhookVerifier::new(config.webhook_secret.clone());
        Self {
            config,
            verifier,
            http_client: reqwest::Client::new(),
        }
    }

    fn verify_at(
        &self,
        payload: &[u8],
        signature: &str,
        now: i64,
    ) -> Result<PaymentEvent, WebhookError> {
        let stripe_event = self
            .verifier
            .verify_and_parse_at(payload, signature, now)
            .map_err(|e| {
                tracing::warn!(error = %e, "Stripe webhook verification failed");
                e
            })?;

        if self.config.require_livemode && !stripe_event.livemode {
            tracing::warn!(event_id = %stripe_event.id, "Rejected test mode event");
            return Err(WebhookError::ParseError(
                "test mode events are not accepted".to_string(),
            ));
        }

        let event = stripe_event.into_payment_event()?;
        tracing::info!(
            event_id = %event.id,
            event_type = event.event_type(),
            "Webhook signature verified"
        );
        Ok(event)
    }

    async fn error_from_response(response: reqwest::Response, operation: &str) -> PaymentError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::error!(%status, error = %body, operation, "Stripe API call failed");

        let code = match status.as_u16() {
            401 | 403 => PaymentErrorCode::AuthenticationError,
            400 => PaymentErrorCode::InvalidRequest,
            404 => PaymentErrorCode::NotFound,
            429 => PaymentErrorCode::RateLimitExceeded,
            _ => PaymentErrorCode::ProviderError,
        };
        PaymentError::new(code, format!("Stripe API error: {}", body))
    }
}

/// Form parameters for `POST /v1/checkout/sessions`.
fn checkout_params(request: &CheckoutRequest) -> Vec<(String, String)> {
    let mut params = vec![
        ("mode".to_string(), "payment".to_string()),
        (
            "customer_email".to_string(),
            request.customer_email.as_str().to_string(),
        ),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
        ("line_items[0][quantity]".to_string(), "1".to_string()),
    ];

    match &request.line_item {
        LineItem::Price { price_id } => {
            params.push(("line_items[0][price]".to_string(), price_id.clone()));
        }
        LineItem::Amount {
            name,
            amount_cents,
            currency,
        } => {
            params.push((
                "line_items[0][price_data][currency]".to_string(),
                currency.clone(),
            ));
            params.push((
                "line_items[0][price_data][unit_amount]".to_string(),
                amount_cents.to_string(),
            ));
            params.push((
                "line_items[0][price_data][product_data][name]".to_string(),
                name.clone(),
            ));
        }
    }

    let mut metadata: Vec<_> = request.metadata.iter().collect();
    metadata.sort();
    for (key, value) in metadata {
        params.push((format!("metadata[{}]", key), value.clone()));
        params.push((
            format!("payment_intent_data[metadata][{}]", key),
            value.clone(),
        ));
    }

    params
}

#[derive(Deserialize)]
struct CheckoutSessionResponse {
    id: String,
    url: Option<String>,
}

#[derive(Deserialize)]
struct PaymentIntentResponse {
    latest_charge: Option<ChargeResponse>,
}

#[derive(Deserialize)]
struct ChargeResponse {
    receipt_url: Option<String>,
}

#[async_trait]
impl PaymentProvider for StripePaymentAdapter {
    async fn create_checkout(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);

        let response = self
            .http_client
            .post(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(&checkout_params(&request))
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response, "create_checkout").await);
        }

        let session: CheckoutSessionResponse = response.json().await.map_err(|e| {
            PaymentError::provider(format!("Failed to parse Stripe response: {}", e))
        })?;

        let url = session
            .url
            .ok_or_else(|| PaymentError::provider("Checkout session has no URL"))?;

        tracing::info!(session_id = %session.id, "Created Stripe checkout session");
        Ok(CheckoutSession {
            id: session.id,
            url,
        })
    }

    fn verify_webhook(&self, payload: &[u8], signature: &str) -> Result<PaymentEvent, WebhookError> {
        self.verify_at(payload, signature, chrono::Utc::now().timestamp())
    }

    async fn retrieve_receipt_url(
        &self,
        checkout: &CompletedCheckout,
    ) -> Result<Option<String>, PaymentError> {
        let Some(intent_id) = checkout.payment_intent_id.as_deref() else {
            return Ok(None);
        };

        let url = format!(
            "{}/v1/payment_intents/{}",
            self.config.api_base_url, intent_id
        );

        let response = self
            .http_client
            .get(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .query(&[("expand[]", "latest_charge")])
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::error_from_response(response, "retrieve_receipt_url").await);
        }

        let intent: PaymentIntentResponse = response.json().await.map_err(|e| {
            PaymentError::provider(format!("Failed to parse Stripe response: {}", e))
        })?;

        Ok(intent.latest_charge.and_then(|charge| charge.receipt_url))
    }
}
