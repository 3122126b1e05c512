//! HandlePaymentWebhookHandler - applies verified processor events exactly once.

use std::sync::Arc;

use crate::domain::foundation::{EmailAddress, ErrorCode, LeadId, Timestamp};
use crate::domain::lead::{Lead, PaymentStatus, PaymentType, Receipt, RecordedPayment};
use crate::domain::payment::{
    CompletedCheckout, PaymentEvent, PaymentEventKind, ReceiptNotice, WebhookError,
};
use crate::ports::{
    EmailMessage, EmailSender, LeadRepository, PaymentProvider, ProcessedEventStore, SaveResult,
};

/// Command to handle a payment webhook.
#[derive(Debug, Clone)]
pub struct HandlePaymentWebhookCommand {
    /// Raw request body, exactly as signed.
    pub payload: Vec<u8>,
    /// `Stripe-Signature` header.
    pub signature: Option<String>,
}

/// Result of webhook processing. Every variant is acknowledged to the processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlePaymentWebhookResult {
    PaymentRecorded {
        lead_id: LeadId,
        payment_type: PaymentType,
        amount_cents: i64,
        status: PaymentStatus,
    },
    /// Event id seen before; nothing was changed.
    Duplicate,
    /// Event type or checkout this service does not act on.
    Ignored,
}

/// Handler for payment processor webhooks.
///
/// The processed-event insert is the idempotency gate: it happens before
/// any side effect, and is undone when a later step fails so the
/// processor's redelivery can try again.
pub struct HandlePaymentWebhookHandler {
    payment_provider: Option<Arc<dyn PaymentProvider>>,
    processed_events: Arc<dyn ProcessedEventStore>,
    leads: Arc<dyn LeadRepository>,
    email_sender: Arc<dyn EmailSender>,
    operator_email: Option<EmailAddress>,
}

impl HandlePaymentWebhookHandler {
    pub fn new(
        payment_provider: Option<Arc<dyn PaymentProvider>>,
        processed_events: Arc<dyn ProcessedEventStore>,
        leads: Arc<dyn LeadRepository>,
        email_sender: Arc<dyn EmailSender>,
        operator_email: Option<EmailAddress>,
    ) -> Self {
        Self {
            payment_provider,
            processed_events,
            leads,
            email_sender,
            operator_email,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandlePaymentWebhookCommand,
    ) -> Result<HandlePaymentWebhookResult, WebhookError> {
        // 1. Refuse everything without processor configuration
        let Some(provider) = &self.payment_provider else {
            tracing::error!("Payment webhook received but payments are not configured");
            return Err(WebhookError::NotConfigured);
        };

        // 2. Verify signature and parse
        let signature = cmd
            .signature
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or(WebhookError::MissingSignature)?;
        let event = provider.verify_webhook(&cmd.payload, signature)?;

        // 3. Idempotency gate
        let received_at = Timestamp::now();
        match self
            .processed_events
            .try_insert(&event.id, event.event_type(), received_at)
            .await
            .map_err(|e| WebhookError::Database(e.to_string()))?
        {
            SaveResult::Inserted => {}
            SaveResult::AlreadyExists => {
                tracing::info!(event_id = %event.id, "Duplicate webhook event acknowledged");
                return Ok(HandlePaymentWebhookResult::Duplicate);
            }
        }

        // 4. Apply; release the marker on failure
        match self.apply(provider.as_ref(), &event, received_at).await {
            Ok(result) => Ok(result),
            Err(err) => {
                tracing::error!(event_id = %event.id, error = %err, "Webhook processing failed");
                if let Err(e) = self.processed_events.remove(&event.id).await {
                    tracing::error!(
                        event_id = %event.id,
                        error = %e,
                        "Failed to release processed-event marker"
                    );
                }
                Err(err)
            }
        }
    }

    async fn apply(
        &self,
        provider: &dyn PaymentProvider,
        event: &PaymentEvent,
        received_at: Timestamp,
    ) -> Result<HandlePaymentWebhookResult, WebhookError> {
        let checkout = match &event.kind {
            PaymentEventKind::CheckoutCompleted(checkout) => checkout,
            PaymentEventKind::Other(event_type) => {
                tracing::debug!(event_id = %event.id, event_type, "Ignoring webhook event");
                return Ok(HandlePaymentWebhookResult::Ignored);
            }
        };

        let Some((lead_id, payment_type)) = checkout.target() else {
            tracing::info!(
                event_id = %event.id,
                session_id = %checkout.session_id,
                "Checkout has no lead metadata; ignoring"
            );
            return Ok(HandlePaymentWebhookResult::Ignored);
        };

        if !checkout.settled {
            tracing::info!(event_id = %event.id, %lead_id, "Checkout completed but not yet paid");
            return Ok(HandlePaymentWebhookResult::Ignored);
        }

        let amount_cents = checkout
            .amount_cents
            .ok_or_else(|| WebhookError::ParseError("checkout has no amount_total".to_string()))?;
        if amount_cents < 0 {
            return Err(WebhookError::ParseError(format!(
                "negative amount_total {amount_cents}"
            )));
        }

        let payment = RecordedPayment {
            event_id: event.id.clone(),
            payment_type,
            amount_cents,
            paid_at: received_at,
            receipt_url: self.receipt_url(provider, checkout).await,
            provider_customer_id: checkout.customer_id.clone(),
        };

        let lead = self
            .leads
            .record_payment(lead_id, &payment)
            .await
            .map_err(|e| match e.code {
                ErrorCode::LeadNotFound => WebhookError::LeadNotFound(lead_id),
                ErrorCode::ValidationFailed => WebhookError::ParseError(e.message),
                _ => WebhookError::Database(e.to_string()),
            })?;

        tracing::info!(
            event_id = %event.id,
            %lead_id,
            %payment_type,
            amount_cents,
            status = %lead.payment.status,
            "Payment applied"
        );

        self.send_receipts(&lead, &payment.receipt()).await;

        Ok(HandlePaymentWebhookResult::PaymentRecorded {
            lead_id,
            payment_type,
            amount_cents,
            status: lead.payment.status,
        })
    }

    /// Hosted receipt link; best effort.
    async fn receipt_url(
        &self,
        provider: &dyn PaymentProvider,
        checkout: &CompletedCheckout,
    ) -> Option<String> {
        match provider.retrieve_receipt_url(checkout).await {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(error = %e, session_id = %checkout.session_id, "Receipt lookup failed");
                None
            }
        }
    }

    /// Payer copy, plus the operator copy when configured and distinct.
    /// Failures are logged; the payment stays recorded.
    async fn send_receipts(&self, lead: &Lead, receipt: &Receipt) {
        let payer = ReceiptNotice::for_payer(lead, receipt);
        let mut messages = vec![EmailMessage::new(lead.email.clone(), payer.subject, payer.html)];

        if let Some(operator) = self.operator_email.as_ref().filter(|op| *op != &lead.email) {
            let copy = ReceiptNotice::for_operator(lead, receipt);
            messages.push(EmailMessage::new(operator.clone(), copy.subject, copy.html));
        }

        for message in &messages {
            if let Err(e) = self.email_sender.send(message).await {
                tracing::warn!(
                    lead_id = %lead.id,
                    error = %e,
                    "Receipt email not sent"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::email::RecordingEmailSender;
    use crate::adapters::memory::{InMemoryLeadRepository, InMemoryProcessedEventStore};
    use crate::adapters::stripe::MockPaymentProvider;
    use crate::domain::foundation::{DomainError, PaymentEventId};
    use crate::domain::lead::Package;
    use crate::domain::payment::CHECKOUT_SESSION_ASYNC_PAYMENT_SUCCEEDED;
    use crate::ports::{EmailError, PaymentError};
    use async_trait::async_trait;
    use serde_json::json;

    const SECRET: &str = "whsec_test_secret";

    // ════════════════════════════════════════════════════════════════════════════
    // Fixtures
    // ════════════════════════════════════════════════════════════════════════════

    struct Fixture {
        handler: HandlePaymentWebhookHandler,
        provider: Arc<MockPaymentProvider>,
        leads: Arc<dyn LeadRepository>,
        events: Arc<InMemoryProcessedEventStore>,
        email: RecordingEmailSender,
        lead: Lead,
    }

    fn lead() -> Lead {
        Lead::new(
            "Ann Murphy",
            EmailAddress::parse("ann@example.com").unwrap(),
            Some(Package::Growth),
            Timestamp::now(),
        )
    }

    fn fixture_with(leads: Arc<dyn LeadRepository>, lead: Lead, operator: Option<&str>) -> Fixture {
        let provider = Arc::new(MockPaymentProvider::new(SECRET));
        let events = Arc::new(InMemoryProcessedEventStore::new());
        let email = RecordingEmailSender::new();
        let payment_provider: Arc<dyn PaymentProvider> = provider.clone();
        let handler = HandlePaymentWebhookHandler::new(
            Some(payment_provider),
            events.clone(),
            leads.clone(),
            Arc::new(email.clone()),
            operator.map(|o| EmailAddress::parse(o).unwrap()),
        );
        Fixture {
            handler,
            provider,
            leads,
            events,
            email,
            lead,
        }
    }

    fn fixture(operator: Option<&str>) -> Fixture {
        let lead = lead();
        let leads = Arc::new(InMemoryLeadRepository::with_leads([lead.clone()]));
        fixture_with(leads, lead, operator)
    }

    fn checkout_payload(event_id: &str, lead_id: &str, payment_type: &str, amount: i64) -> Vec<u8> {
        session_payload(
            event_id,
            "checkout.session.completed",
            "paid",
            lead_id,
            payment_type,
            amount,
        )
    }

    fn session_payload(
        event_id: &str,
        event_type: &str,
        payment_status: &str,
        lead_id: &str,
        payment_type: &str,
        amount: i64,
    ) -> Vec<u8> {
        json!({
            "id": event_id,
            "type": event_type,
            "created": chrono::Utc::now().timestamp(),
            "data": { "object": {
                "id": "cs_test_1",
                "customer": "cus_123",
                "amount_total": amount,
                "currency": "eur",
                "payment_status": payment_status,
                "metadata": { "lead_id": lead_id, "payment_type": payment_type }
            }}
        })
        .to_string()
        .into_bytes()
    }

    fn signed(f: &Fixture, payload: Vec<u8>) -> HandlePaymentWebhookCommand {
        let signature = f.provider.sign(&payload, chrono::Utc::now().timestamp());
        HandlePaymentWebhookCommand {
            payload,
            signature: Some(signature),
        }
    }

    fn deposit(f: &Fixture, event_id: &str) -> HandlePaymentWebhookCommand {
        signed(
            f,
            checkout_payload(event_id, &f.lead.id.to_string(), "deposit", 20_000),
        )
    }

    async fn stored(f: &Fixture) -> Lead {
        f.leads.find_by_id(f.lead.id).await.unwrap().unwrap()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Payment Application
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn deposit_advances_status_and_total() {
        let f = fixture(None);
        f.provider.set_receipt_url("https://pay.stripe.com/receipts/abc");

        let result = f.handler.handle(deposit(&f, "evt_123")).await.unwrap();
        assert_eq!(
            result,
            HandlePaymentWebhookResult::PaymentRecorded {
                lead_id: f.lead.id,
                payment_type: PaymentType::Deposit,
                amount_cents: 20_000,
                status: PaymentStatus::PaidDeposit,
            }
        );

        let lead = stored(&f).await;
        assert_eq!(lead.payment.total_paid_cents, 20_000);
        assert_eq!(lead.payment.receipts.len(), 1);
        assert_eq!(
            lead.payment.receipts[0].receipt_url.as_deref(),
            Some("https://pay.stripe.com/receipts/abc")
        );
        assert_eq!(lead.provider_customer_id.as_deref(), Some("cus_123"));
    }

    #[tokio::test]
    async fn balance_after_deposit_is_paid_full() {
        let f = fixture(None);
        f.handler.handle(deposit(&f, "evt_1")).await.unwrap();
        let balance = signed(
            &f,
            checkout_payload("evt_2", &f.lead.id.to_string(), "balance", 100_000),
        );
        f.handler.handle(balance).await.unwrap();

        let lead = stored(&f).await;
        assert_eq!(lead.payment.status, PaymentStatus::PaidFull);
        assert_eq!(lead.payment.total_paid_cents, 120_000);
        assert_eq!(lead.balance_due_cents(), Some(0));
    }

    #[tokio::test]
    async fn duplicate_event_changes_nothing() {
        let f = fixture(None);

        f.handler.handle(deposit(&f, "evt_123")).await.unwrap();
        let second = f.handler.handle(deposit(&f, "evt_123")).await.unwrap();

        assert_eq!(second, HandlePaymentWebhookResult::Duplicate);
        let lead = stored(&f).await;
        assert_eq!(lead.payment.total_paid_cents, 20_000);
        assert_eq!(lead.payment.receipts.len(), 1);
        assert_eq!(f.email.sent_to("ann@example.com").len(), 1);
    }

    #[tokio::test]
    async fn unrelated_events_are_ignored_but_recorded() {
        let f = fixture(None);
        let payload = json!({
            "id": "evt_other",
            "type": "invoice.paid",
            "created": 0,
            "data": { "object": {} }
        })
        .to_string()
        .into_bytes();

        let result = f.handler.handle(signed(&f, payload)).await.unwrap();
        assert_eq!(result, HandlePaymentWebhookResult::Ignored);
        assert!(f.events.contains(&PaymentEventId::new("evt_other").unwrap()).await);
    }

    #[tokio::test]
    async fn checkout_without_metadata_is_ignored() {
        let f = fixture(None);
        let payload = checkout_payload("evt_9", "", "", 5_000);

        let result = f.handler.handle(signed(&f, payload)).await.unwrap();
        assert_eq!(result, HandlePaymentWebhookResult::Ignored);
        assert_eq!(stored(&f).await.payment.total_paid_cents, 0);
    }

    #[tokio::test]
    async fn delayed_payment_applies_once_on_async_success() {
        let f = fixture(None);
        let lead_id = f.lead.id.to_string();

        let completed = signed(
            &f,
            session_payload(
                "evt_completed",
                "checkout.session.completed",
                "unpaid",
                &lead_id,
                "deposit",
                20_000,
            ),
        );
        assert_eq!(
            f.handler.handle(completed).await.unwrap(),
            HandlePaymentWebhookResult::Ignored
        );
        assert_eq!(stored(&f).await.payment.status, PaymentStatus::Unpaid);

        let succeeded = || {
            signed(
                &f,
                session_payload(
                    "evt_async_ok",
                    CHECKOUT_SESSION_ASYNC_PAYMENT_SUCCEEDED,
                    "paid",
                    &lead_id,
                    "deposit",
                    20_000,
                ),
            )
        };
        assert!(matches!(
            f.handler.handle(succeeded()).await,
            Ok(HandlePaymentWebhookResult::PaymentRecorded {
                status: PaymentStatus::PaidDeposit,
                ..
            })
        ));
        assert_eq!(
            f.handler.handle(succeeded()).await.unwrap(),
            HandlePaymentWebhookResult::Duplicate
        );

        let lead = stored(&f).await;
        assert_eq!(lead.payment.total_paid_cents, 20_000);
        assert_eq!(lead.payment.receipts.len(), 1);
        assert_eq!(f.email.sent_to("ann@example.com").len(), 1);
    }

    #[tokio::test]
    async fn negative_amount_never_lowers_total() {
        let f = fixture(None);
        f.handler.handle(deposit(&f, "evt_a")).await.unwrap();

        let negative = signed(
            &f,
            checkout_payload("evt_b", &f.lead.id.to_string(), "balance", -5_000),
        );
        let err = f.handler.handle(negative).await.unwrap_err();

        assert!(matches!(err, WebhookError::ParseError(_)));
        let lead = stored(&f).await;
        assert_eq!(lead.payment.total_paid_cents, 20_000);
        assert_eq!(lead.payment.status, PaymentStatus::PaidDeposit);
        assert_eq!(lead.payment.receipts.len(), 1);
        assert!(!f.events.contains(&PaymentEventId::new("evt_b").unwrap()).await);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Receipts
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn operator_gets_copy_when_distinct() {
        let f = fixture(Some("owner@nextlevelweb.ie"));
        f.handler.handle(deposit(&f, "evt_1")).await.unwrap();

        let payer = f.email.sent_to("ann@example.com");
        assert_eq!(payer.len(), 1);
        assert_eq!(payer[0].subject, "Payment received: €200 deposit");
        assert_eq!(f.email.sent_to("owner@nextlevelweb.ie").len(), 1);
    }

    #[tokio::test]
    async fn operator_copy_skipped_when_same_as_payer() {
        let f = fixture(Some("ann@example.com"));
        f.handler.handle(deposit(&f, "evt_1")).await.unwrap();
        assert_eq!(f.email.sent().len(), 1);
    }

    #[tokio::test]
    async fn email_failure_keeps_payment() {
        let f = fixture(Some("owner@nextlevelweb.ie"));
        f.email.fail_with(EmailError::Unavailable("down".to_string()));
        f.provider.fail_receipts(PaymentError::network("timeout"));

        let result = f.handler.handle(deposit(&f, "evt_1")).await;
        assert!(matches!(
            result,
            Ok(HandlePaymentWebhookResult::PaymentRecorded { .. })
        ));
        let lead = stored(&f).await;
        assert_eq!(lead.payment.total_paid_cents, 20_000);
        assert_eq!(lead.payment.receipts[0].receipt_url, None);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Rejections and Compensation
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn bad_signature_changes_nothing() {
        let f = fixture(None);
        let payload = checkout_payload("evt_1", &f.lead.id.to_string(), "deposit", 20_000);
        let cmd = HandlePaymentWebhookCommand {
            payload,
            signature: Some(format!("t={},v1=deadbeef", chrono::Utc::now().timestamp())),
        };

        assert_eq!(
            f.handler.handle(cmd).await,
            Err(WebhookError::InvalidSignature)
        );
        assert!(!f.events.contains(&PaymentEventId::new("evt_1").unwrap()).await);
        assert_eq!(stored(&f).await.payment.total_paid_cents, 0);
    }

    #[tokio::test]
    async fn missing_signature_rejected() {
        let f = fixture(None);
        let cmd = HandlePaymentWebhookCommand {
            payload: b"{}".to_vec(),
            signature: None,
        };
        assert_eq!(
            f.handler.handle(cmd).await,
            Err(WebhookError::MissingSignature)
        );
    }

    #[tokio::test]
    async fn unconfigured_provider_refuses_all_events() {
        let handler = HandlePaymentWebhookHandler::new(
            None,
            Arc::new(InMemoryProcessedEventStore::new()),
            Arc::new(InMemoryLeadRepository::new()),
            Arc::new(RecordingEmailSender::new()),
            None,
        );
        let cmd = HandlePaymentWebhookCommand {
            payload: b"{}".to_vec(),
            signature: Some("t=1,v1=00".to_string()),
        };
        assert_eq!(handler.handle(cmd).await, Err(WebhookError::NotConfigured));
    }

    #[tokio::test]
    async fn unknown_lead_releases_marker_for_retry() {
        let f = fixture(None);
        let missing = LeadId::new();
        let cmd = signed(
            &f,
            checkout_payload("evt_7", &missing.to_string(), "deposit", 20_000),
        );

        assert_eq!(
            f.handler.handle(cmd).await,
            Err(WebhookError::LeadNotFound(missing))
        );
        assert!(!f.events.contains(&PaymentEventId::new("evt_7").unwrap()).await);
    }

    struct FailingLeadRepository;

    #[async_trait]
    impl LeadRepository for FailingLeadRepository {
        async fn save(&self, _lead: &Lead) -> Result<(), DomainError> {
            Ok(())
        }

        async fn find_by_id(&self, _id: LeadId) -> Result<Option<Lead>, DomainError> {
            Ok(None)
        }

        async fn find_owned(
            &self,
            _id: LeadId,
            _email: &EmailAddress,
        ) -> Result<Option<Lead>, DomainError> {
            Ok(None)
        }

        async fn find_latest_by_email(
            &self,
            _email: &EmailAddress,
        ) -> Result<Option<Lead>, DomainError> {
            Ok(None)
        }

        async fn set_package(
            &self,
            _id: LeadId,
            _package: Package,
            _at: Timestamp,
        ) -> Result<Lead, DomainError> {
            Err(DomainError::database("connection reset"))
        }

        async fn record_payment(
            &self,
            _id: LeadId,
            _payment: &RecordedPayment,
        ) -> Result<Lead, DomainError> {
            Err(DomainError::database("connection reset"))
        }
    }

    #[tokio::test]
    async fn storage_failure_is_retryable_and_reprocessable() {
        let f = fixture_with(Arc::new(FailingLeadRepository), lead(), None);
        let err = f.handler.handle(deposit(&f, "evt_db")).await.unwrap_err();

        assert!(matches!(err, WebhookError::Database(_)));
        assert!(err.is_retryable());
        assert!(!f.events.contains(&PaymentEventId::new("evt_db").unwrap()).await);
        assert!(f.email.sent().is_empty());
    }
}
