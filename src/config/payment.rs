//! Payment configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::lead::Package;

/// Payment configuration (Stripe)
///
/// Payments are enabled only when both the API key and the webhook secret are
/// present. With either missing the webhook endpoint refuses every event.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Stripe API key
    pub stripe_api_key: Option<String>,

    /// Stripe webhook signing secret
    pub stripe_webhook_secret: Option<String>,

    /// ISO currency code used for ad-hoc balance prices
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Stripe price ID for the starter package deposit
    pub starter_deposit_price_id: Option<String>,

    /// Stripe price ID for the growth package deposit
    pub growth_deposit_price_id: Option<String>,

    /// Stripe price ID for the premium package deposit
    pub premium_deposit_price_id: Option<String>,
}

impl PaymentConfig {
    /// API key and webhook secret, when both are configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let key = self.stripe_api_key.as_deref().filter(|k| !k.is_empty())?;
        let secret = self
            .stripe_webhook_secret
            .as_deref()
            .filter(|s| !s.is_empty())?;
        Some((key, secret))
    }

    pub fn is_enabled(&self) -> bool {
        self.credentials().is_some()
    }

    /// Configured deposit price for a package. Custom quotes have none.
    pub fn deposit_price_id(&self, package: Package) -> Option<&str> {
        let id = match package {
            Package::Starter => self.starter_deposit_price_id.as_deref(),
            Package::Growth => self.growth_deposit_price_id.as_deref(),
            Package::Premium => self.premium_deposit_price_id.as_deref(),
            Package::Custom => None,
        };
        id.filter(|id| !id.is_empty())
    }

    /// Check if using Stripe test mode
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key
            .as_deref()
            .is_some_and(|k| k.starts_with("sk_test_"))
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(key) = self.stripe_api_key.as_deref().filter(|k| !k.is_empty()) {
            if !key.starts_with("sk_") {
                return Err(ValidationError::InvalidStripeKey);
            }
        }
        if let Some(secret) = self
            .stripe_webhook_secret
            .as_deref()
            .filter(|s| !s.is_empty())
        {
            if !secret.starts_with("whsec_") {
                return Err(ValidationError::InvalidStripeWebhookSecret);
            }
        }
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::InvalidCurrency);
        }
        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            stripe_api_key: None,
            stripe_webhook_secret: None,
            currency: default_currency(),
            starter_deposit_price_id: None,
            growth_deposit_price_id: None,
            premium_deposit_price_id: None,
        }
    }
}

fn default_currency() -> String {
    "eur".to_string()
}
