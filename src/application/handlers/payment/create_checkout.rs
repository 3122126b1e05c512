//! CreateCheckoutHandler - starts a hosted checkout for a deposit or balance.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::application::handlers::lead::{ResolveLeadHandler, ResolveLeadQuery};
use crate::config::PaymentConfig;
use crate::domain::auth::SessionClaims;
use crate::domain::foundation::DomainError;
use crate::domain::lead::{Lead, Package, PaymentType};
use crate::domain::payment::{METADATA_LEAD_ID, METADATA_PAYMENT_TYPE};
use crate::ports::{CheckoutRequest, LineItem, PaymentError, PaymentProvider};

/// Command to start a checkout for the session's lead.
#[derive(Debug, Clone)]
pub struct CreateCheckoutCommand {
    pub session: SessionClaims,
    pub payment_type: PaymentType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCheckoutResult {
    /// Hosted checkout page to send the browser to.
    pub redirect_url: String,
    pub session_id: String,
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Payments not configured")]
    PaymentsDisabled,

    #[error("No lead found")]
    LeadNotFound,

    #[error("Deposit price not configured for this package")]
    NoDepositPrice,

    #[error("No balance owing")]
    NothingOwed,

    #[error("Checkout failed: {0}")]
    Provider(#[source] PaymentError),

    #[error("Server error")]
    Storage(#[from] DomainError),
}

/// Checkout settings derived from configuration at start.
#[derive(Debug, Clone, Default)]
pub struct CheckoutSettings {
    pub base_url: String,
    pub currency: String,
    pub deposit_price_ids: HashMap<Package, String>,
}

impl CheckoutSettings {
    pub fn from_config(config: &PaymentConfig, base_url: &str) -> Self {
        let deposit_price_ids = [Package::Starter, Package::Growth, Package::Premium]
            .into_iter()
            .filter_map(|p| config.deposit_price_id(p).map(|id| (p, id.to_string())))
            .collect();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            currency: config.currency.to_lowercase(),
            deposit_price_ids,
        }
    }

    fn success_url(&self) -> String {
        format!("{}/dashboard?paid=1", self.base_url)
    }

    fn cancel_url(&self) -> String {
        format!("{}/dashboard", self.base_url)
    }
}

/// Handler for customer checkout requests.
///
/// The webhook, not this handler, records the payment: the metadata written
/// here is what ties the completed checkout back to the lead.
pub struct CreateCheckoutHandler {
    payment_provider: Option<Arc<dyn PaymentProvider>>,
    resolver: ResolveLeadHandler,
    settings: CheckoutSettings,
}

impl CreateCheckoutHandler {
    pub fn new(
        payment_provider: Option<Arc<dyn PaymentProvider>>,
        resolver: ResolveLeadHandler,
        settings: CheckoutSettings,
    ) -> Self {
        Self {
            payment_provider,
            resolver,
            settings,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateCheckoutCommand,
    ) -> Result<CreateCheckoutResult, CheckoutError> {
        let provider = self
            .payment_provider
            .as_ref()
            .ok_or(CheckoutError::PaymentsDisabled)?;

        let lead = self
            .resolver
            .handle(ResolveLeadQuery::from(&cmd.session))
            .await?
            .ok_or(CheckoutError::LeadNotFound)?;

        let line_item = self.line_item(&lead, cmd.payment_type)?;

        let metadata = HashMap::from([
            (METADATA_LEAD_ID.to_string(), lead.id.to_string()),
            (
                METADATA_PAYMENT_TYPE.to_string(),
                cmd.payment_type.as_str().to_string(),
            ),
        ]);

        let session = provider
            .create_checkout(CheckoutRequest {
                customer_email: lead.email.clone(),
                line_item,
                success_url: self.settings.success_url(),
                cancel_url: self.settings.cancel_url(),
                metadata,
            })
            .await
            .map_err(|e| {
                tracing::error!(lead_id = %lead.id, error = %e, "Checkout creation failed");
                CheckoutError::Provider(e)
            })?;

        tracing::info!(
            lead_id = %lead.id,
            payment_type = %cmd.payment_type,
            session_id = %session.id,
            "Checkout started"
        );

        Ok(CreateCheckoutResult {
            redirect_url: session.url,
            session_id: session.id,
        })
    }

    fn line_item(&self, lead: &Lead, payment_type: PaymentType) -> Result<LineItem, CheckoutError> {
        match payment_type {
            PaymentType::Deposit => lead
                .package
                .and_then(|p| self.settings.deposit_price_ids.get(&p))
                .map(|price_id| LineItem::Price {
                    price_id: price_id.clone(),
                })
                .ok_or(CheckoutError::NoDepositPrice),
            PaymentType::Balance => {
                let owed = lead
                    .balance_due_cents()
                    .filter(|cents| *cents > 0)
                    .ok_or(CheckoutError::NothingOwed)?;
                Ok(LineItem::Amount {
                    name: format!("{} package balance", lead.package_label()),
                    amount_cents: owed,
                    currency: self.settings.currency.clone(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryLeadRepository;
    use crate::adapters::stripe::MockPaymentProvider;
    use crate::domain::foundation::{EmailAddress, PaymentEventId, Timestamp};
    use crate::domain::lead::RecordedPayment;
    use crate::ports::LeadRepository;

    fn email(s: &str) -> EmailAddress {
        EmailAddress::parse(s).unwrap()
    }

    fn settings() -> CheckoutSettings {
        CheckoutSettings {
            base_url: "https://site.test".to_string(),
            currency: "eur".to_string(),
            deposit_price_ids: HashMap::from([(Package::Growth, "price_growth".to_string())]),
        }
    }

    struct Fixture {
        handler: CreateCheckoutHandler,
        provider: Arc<MockPaymentProvider>,
        leads: Arc<InMemoryLeadRepository>,
        lead: Lead,
    }

    fn fixture(package: Option<Package>) -> Fixture {
        let lead = Lead::new("Ann", email("ann@example.com"), package, Timestamp::now());
        let leads = Arc::new(InMemoryLeadRepository::with_leads([lead.clone()]));
        let provider = Arc::new(MockPaymentProvider::new("whsec_test"));
        let payment_provider: Arc<dyn PaymentProvider> = provider.clone();
        let handler = CreateCheckoutHandler::new(
            Some(payment_provider),
            ResolveLeadHandler::new(leads.clone()),
            settings(),
        );
        Fixture {
            handler,
            provider,
            leads,
            lead,
        }
    }

    fn command(f: &Fixture, payment_type: PaymentType) -> CreateCheckoutCommand {
        CreateCheckoutCommand {
            session: SessionClaims::customer(f.lead.email.clone(), Some(f.lead.id), Timestamp::now()),
            payment_type,
        }
    }

    async fn pay(f: &Fixture, event: &str, payment_type: PaymentType, amount_cents: i64) {
        f.leads
            .record_payment(
                f.lead.id,
                &RecordedPayment {
                    event_id: PaymentEventId::new(event).unwrap(),
                    payment_type,
                    amount_cents,
                    paid_at: Timestamp::now(),
                    receipt_url: None,
                    provider_customer_id: None,
                },
            )
            .await
            .unwrap();
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Deposit
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn deposit_uses_package_price_and_metadata() {
        let f = fixture(Some(Package::Growth));
        let result = f.handler.handle(command(&f, PaymentType::Deposit)).await.unwrap();

        assert!(result.redirect_url.starts_with("https://checkout.stripe.test/pay/"));
        let requests = f.provider.checkouts();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(
            request.line_item,
            LineItem::Price {
                price_id: "price_growth".to_string()
            }
        );
        assert_eq!(request.customer_email.as_str(), "ann@example.com");
        assert_eq!(request.success_url, "https://site.test/dashboard?paid=1");
        assert_eq!(request.cancel_url, "https://site.test/dashboard");
        assert_eq!(
            request.metadata.get(METADATA_LEAD_ID),
            Some(&f.lead.id.to_string())
        );
        assert_eq!(
            request.metadata.get(METADATA_PAYMENT_TYPE).map(String::as_str),
            Some("deposit")
        );
    }

    #[tokio::test]
    async fn deposit_without_configured_price_rejected() {
        let f = fixture(Some(Package::Starter));
        let err = f.handler.handle(command(&f, PaymentType::Deposit)).await.unwrap_err();
        assert!(matches!(err, CheckoutError::NoDepositPrice));
        assert!(f.provider.checkouts().is_empty());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Balance
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn balance_charges_remaining_amount() {
        let f = fixture(Some(Package::Growth));
        pay(&f, "evt_dep", PaymentType::Deposit, 20_000).await;

        f.handler.handle(command(&f, PaymentType::Balance)).await.unwrap();
        assert_eq!(
            f.provider.checkouts()[0].line_item,
            LineItem::Amount {
                name: "Growth package balance".to_string(),
                amount_cents: 100_000,
                currency: "eur".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn balance_rejected_when_paid_or_unpriced() {
        let paid = fixture(Some(Package::Growth));
        pay(&paid, "evt_full", PaymentType::Balance, 120_000).await;
        assert!(matches!(
            paid.handler.handle(command(&paid, PaymentType::Balance)).await,
            Err(CheckoutError::NothingOwed)
        ));

        let custom = fixture(Some(Package::Custom));
        assert!(matches!(
            custom.handler.handle(command(&custom, PaymentType::Balance)).await,
            Err(CheckoutError::NothingOwed)
        ));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Preconditions
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn session_for_someone_else_finds_no_lead() {
        let f = fixture(Some(Package::Growth));
        let cmd = CreateCheckoutCommand {
            session: SessionClaims::customer(email("eve@example.com"), Some(f.lead.id), Timestamp::now()),
            payment_type: PaymentType::Deposit,
        };
        assert!(matches!(
            f.handler.handle(cmd).await,
            Err(CheckoutError::LeadNotFound)
        ));
    }

    #[tokio::test]
    async fn disabled_payments_refused() {
        let f = fixture(Some(Package::Growth));
        let handler = CreateCheckoutHandler::new(None, ResolveLeadHandler::new(f.leads.clone()), settings());
        assert!(matches!(
            handler.handle(command(&f, PaymentType::Deposit)).await,
            Err(CheckoutError::PaymentsDisabled)
        ));
    }

    #[tokio::test]
    async fn provider_failure_surfaces() {
        let f = fixture(Some(Package::Growth));
        f.provider.fail_next_checkout(PaymentError::provider("No such price"));
        assert!(matches!(
            f.handler.handle(command(&f, PaymentType::Deposit)).await,
            Err(CheckoutError::Provider(_))
        ));
    }

    #[test]
    fn settings_from_config_skip_blank_prices() {
        let config = PaymentConfig {
            stripe_api_key: Some("sk_test_x".to_string()),
            stripe_webhook_secret: Some("whsec_x".to_string()),
            currency: "EUR".to_string(),
            starter_deposit_price_id: Some("price_s".to_string()),
            growth_deposit_price_id: Some(String::new()),
            premium_deposit_price_id: None,
        };
        let settings = CheckoutSettings::from_config(&config, "https://site.test/");
        assert_eq!(settings.base_url, "https://site.test");
        assert_eq!(settings.currency, "eur");
        assert_eq!(settings.deposit_price_ids.len(), 1);
        assert_eq!(settings.deposit_price_ids[&Package::Starter], "price_s");
    }
}
