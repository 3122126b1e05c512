//! Mock payment provider for testing.
//!
//! Verifies webhooks with a real signing secret so tests exercise the same
//! signature path as production, and records checkout requests.
//!
//! # Example
//!
//! ```ignore
//! let mock = MockPaymentProvider::new("whsec_test");
//! let header = mock.sign(payload, now);
//! handler.handle(HandlePaymentWebhook { payload, signature: header }).await?;
//! assert_eq!(mock.checkouts().len(), 0);
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use secrecy::SecretString;

use crate::domain::payment::{
    sign_payload, CompletedCheckout, PaymentEvent, StripeWebhookVerifier, WebhookError,
};
use crate::ports::{CheckoutRequest, CheckoutSession, PaymentError, PaymentProvider};

pub struct MockPaymentProvider {
    secret: String,
    verifier: StripeWebhookVerifier,
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    checkouts: Vec<CheckoutRequest>,
    receipt_url: Option<String>,
    checkout_error: Option<PaymentError>,
    receipt_error: Option<PaymentError>,
}

impl MockPaymentProvider {
    pub fn new(webhook_secret: impl Into<String>) -> Self {
        let secret = webhook_secret.into();
        Self {
            verifier: StripeWebhookVerifier::new(SecretString::new(secret.clone())),
            secret,
            inner: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Signature header for `payload` as the processor would send it.
    pub fn sign(&self, payload: &[u8], timestamp: i64) -> String {
        sign_payload(&self.secret, timestamp, payload)
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Receipt URL returned for every completed checkout.
    pub fn set_receipt_url(&self, url: impl Into<String>) {
        self.inner.lock().unwrap().receipt_url = Some(url.into());
    }

    /// Fail the next `create_checkout` call.
    pub fn fail_next_checkout(&self, error: PaymentError) {
        self.inner.lock().unwrap().checkout_error = Some(error);
    }

    /// Fail every receipt lookup.
    pub fn fail_receipts(&self, error: PaymentError) {
        self.inner.lock().unwrap().receipt_error = Some(error);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Assertions
    // ════════════════════════════════════════════════════════════════════════════

    pub fn checkouts(&self) -> Vec<CheckoutRequest> {
        self.inner.lock().unwrap().checkouts.clone()
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_checkout(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let mut state = self.inner.lock().unwrap();
        if let Some(error) = state.checkout_error.take() {
            return Err(error);
        }
        state.checkouts.push(request);
        let id = format!("cs_mock_{}", state.checkouts.len());
        Ok(CheckoutSession {
            url: format!("https://checkout.stripe.test/pay/{}", id),
            id,
        })
    }

    fn verify_webhook(&self, payload: &[u8], signature: &str) -> Result<PaymentEvent, WebhookError> {
        self.verifier
            .verify_and_parse(payload, signature)?
            .into_payment_event()
    }

    async fn retrieve_receipt_url(
        &self,
        _checkout: &CompletedCheckout,
    ) -> Result<Option<String>, PaymentError> {
        let state = self.inner.lock().unwrap();
        if let Some(error) = &state.receipt_error {
            return Err(error.clone());
        }
        Ok(state.receipt_url.clone())
    }
}
