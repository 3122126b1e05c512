//! Shared application state for the HTTP surface.

use std::sync::Arc;

use secrecy::SecretString;

use crate::application::{
    CheckoutSettings, CleanupMagicLinksHandler, CreateCheckoutHandler, GetDashboardHandler,
    GetLeadHandler, HandlePaymentWebhookHandler, RedeemLoginLinkHandler, RequestLoginLinkHandler,
    ResolveLeadHandler, SelectPackageHandler, UnsubscribeHandler,
};
use crate::config::AppConfig;
use crate::domain::auth::UnsubscribeSigner;
use crate::domain::foundation::EmailAddress;
use crate::ports::{
    EmailSender, LeadRepository, MagicLinkRepository, PaymentProvider, ProcessedEventStore,
    RateLimiter, SessionCodec, SubscriberRepository,
};

use super::session_cookie::SessionCookie;

/// Settings derived from configuration once at start.
#[derive(Debug, Clone, Default)]
pub struct HttpSettings {
    /// Public origin used in emailed links and checkout return URLs.
    pub base_url: String,
    pub admin_email: Option<EmailAddress>,
    pub operator_email: Option<EmailAddress>,
    /// Bearer secret for the cleanup trigger; the route is refused without one.
    pub cron_secret: Option<SecretString>,
    pub cookie: SessionCookie,
    pub checkout: CheckoutSettings,
}

impl HttpSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        let base_url = config.server.base_url().to_string();
        Self {
            admin_email: parse_optional(config.auth.admin_email_normalized()),
            operator_email: parse_optional(config.email.operator_email_normalized()),
            cron_secret: config
                .auth
                .cron_secret
                .clone()
                .filter(|s| !s.is_empty())
                .map(SecretString::new),
            cookie: SessionCookie::new(config.is_production(), config.auth.cookie_domain.clone()),
            checkout: CheckoutSettings::from_config(&config.payment, &base_url),
            base_url,
        }
    }
}

fn parse_optional(raw: Option<String>) -> Option<EmailAddress> {
    raw.and_then(|e| EmailAddress::parse(&e).ok())
}

/// Dependencies shared by every request.
///
/// Cloned per request; everything inside is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub magic_links: Arc<dyn MagicLinkRepository>,
    pub leads: Arc<dyn LeadRepository>,
    pub processed_events: Arc<dyn ProcessedEventStore>,
    pub subscribers: Arc<dyn SubscriberRepository>,
    /// Absent when the processor is not configured.
    pub payment_provider: Option<Arc<dyn PaymentProvider>>,
    pub email_sender: Arc<dyn EmailSender>,
    pub session_codec: Arc<dyn SessionCodec>,
    pub unsubscribe_signer: Arc<UnsubscribeSigner>,
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub settings: Arc<HttpSettings>,
}

impl AppState {
    pub fn request_login_link_handler(&self) -> RequestLoginLinkHandler {
        RequestLoginLinkHandler::new(
            self.magic_links.clone(),
            self.leads.clone(),
            self.email_sender.clone(),
            self.settings.admin_email.clone(),
            self.settings.base_url.clone(),
        )
    }

    pub fn redeem_login_link_handler(&self) -> RedeemLoginLinkHandler {
        RedeemLoginLinkHandler::new(
            self.magic_links.clone(),
            self.leads.clone(),
            self.session_codec.clone(),
        )
    }

    pub fn cleanup_magic_links_handler(&self) -> CleanupMagicLinksHandler {
        CleanupMagicLinksHandler::new(self.magic_links.clone())
    }

    pub fn webhook_handler(&self) -> HandlePaymentWebhookHandler {
        HandlePaymentWebhookHandler::new(
            self.payment_provider.clone(),
            self.processed_events.clone(),
            self.leads.clone(),
            self.email_sender.clone(),
            self.settings.operator_email.clone(),
        )
    }

    pub fn checkout_handler(&self) -> CreateCheckoutHandler {
        CreateCheckoutHandler::new(
            self.payment_provider.clone(),
            ResolveLeadHandler::new(self.leads.clone()),
            self.settings.checkout.clone(),
        )
    }

    pub fn dashboard_handler(&self) -> GetDashboardHandler {
        GetDashboardHandler::new(
            ResolveLeadHandler::new(self.leads.clone()),
            self.payment_provider.is_some(),
        )
    }

    pub fn select_package_handler(&self) -> SelectPackageHandler {
        SelectPackageHandler::new(
            ResolveLeadHandler::new(self.leads.clone()),
            self.leads.clone(),
        )
    }

    pub fn lead_handler(&self) -> GetLeadHandler {
        GetLeadHandler::new(self.leads.clone())
    }

    pub fn unsubscribe_handler(&self) -> UnsubscribeHandler {
        UnsubscribeHandler::new(self.unsubscribe_signer.clone(), self.subscribers.clone())
    }
}
