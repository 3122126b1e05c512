//! EmailSender port - outbound transactional email.
//!
//! Expected delivery failures (bad address, provider down, not configured)
//! come back as `EmailError`; implementations never panic on them.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::EmailAddress;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: EmailAddress,
    pub subject: String,
    pub html: String,
}

impl EmailMessage {
    pub fn new(to: EmailAddress, subject: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            to,
            subject: subject.into(),
            html: html.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmailError {
    #[error("email delivery is not configured")]
    NotConfigured,

    #[error("email provider rejected the message: {0}")]
    Rejected(String),

    #[error("email provider unreachable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError>;
}
