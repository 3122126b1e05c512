//! Resend email adapter.
//!
//! Posts JSON to `https://api.resend.com/emails` with a bearer API key.
//! Without a key every send fails with `EmailError::NotConfigured`.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::config::EmailConfig;
use crate::ports::{EmailError, EmailMessage, EmailSender};

#[derive(Clone)]
pub struct ResendConfig {
    api_key: Option<SecretString>,
    /// `Name <address>`
    from: String,
    api_base_url: String,
}

impl ResendConfig {
    pub fn new(api_key: Option<String>, from: impl Into<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.is_empty()).map(SecretString::new),
            from: from.into(),
            api_base_url: "https://api.resend.com".to_string(),
        }
    }

    pub fn from_email_config(config: &EmailConfig) -> Self {
        Self::new(config.resend_api_key.clone(), config.from_header())
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[derive(Debug, Serialize)]
struct SendEmailBody<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

pub struct ResendEmailSender {
    config: ResendConfig,
    http_client: reqwest::Client,
}

impl ResendEmailSender {
    pub fn new(config: ResendConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl EmailSender for ResendEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        let Some(api_key) = &self.config.api_key else {
            tracing::warn!(subject = %message.subject, "Email not sent: no Resend API key");
            return Err(EmailError::NotConfigured);
        };

        let body = SendEmailBody {
            from: &self.config.from,
            to: [message.to.as_str()],
            subject: &message.subject,
            html: &message.html,
        };

        let response = self
            .http_client
            .post(format!("{}/emails", self.config.api_base_url))
            .bearer_auth(api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(subject = %message.subject, "Email accepted by Resend");
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        tracing::error!(%status, error = %text, "Resend send failed");
        if status.is_server_error() {
            Err(EmailError::Unavailable(format!("status {}: {}", status, text)))
        } else {
            Err(EmailError::Rejected(format!("status {}: {}", status, text)))
        }
    }
}
