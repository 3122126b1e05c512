//! Email sender that keeps messages in memory.
//!
//! Used by tests and by local runs without a Resend key, where login links
//! are read from the log instead of an inbox.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::ports::{EmailError, EmailMessage, EmailSender};

#[derive(Clone, Default)]
pub struct RecordingEmailSender {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
    failure: Arc<Mutex<Option<EmailError>>>,
}

impl RecordingEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every subsequent send fails with `error`.
    pub fn fail_with(&self, error: EmailError) {
        *self.failure.lock().unwrap() = Some(error);
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Messages addressed to `to`, oldest first.
    pub fn sent_to(&self, to: &str) -> Vec<EmailMessage> {
        self.sent()
            .into_iter()
            .filter(|m| m.to.as_str() == to)
            .collect()
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Err(error);
        }
        tracing::info!(to = %message.to.as_str(), subject = %message.subject, "Recorded email");
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}
