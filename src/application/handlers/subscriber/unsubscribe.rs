//! UnsubscribeHandler - opts an address out of marketing email.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::auth::{UnsubscribeError, UnsubscribeSigner};
use crate::domain::foundation::{DomainError, EmailAddress, Timestamp};
use crate::ports::SubscriberRepository;

/// Query parameters from an unsubscribe link.
#[derive(Debug, Clone, Default)]
pub struct UnsubscribeCommand {
    pub email: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Error)]
pub enum UnsubscribeFailure {
    #[error("Missing email or token")]
    MissingParameters,

    #[error("Unsubscribe is not configured")]
    NotConfigured,

    #[error("Invalid or expired unsubscribe link")]
    InvalidToken,

    #[error("Server error")]
    Storage(#[from] DomainError),
}

impl From<UnsubscribeError> for UnsubscribeFailure {
    fn from(err: UnsubscribeError) -> Self {
        match err {
            UnsubscribeError::NotConfigured => UnsubscribeFailure::NotConfigured,
            UnsubscribeError::Invalid => UnsubscribeFailure::InvalidToken,
        }
    }
}

pub struct UnsubscribeHandler {
    signer: Arc<UnsubscribeSigner>,
    subscribers: Arc<dyn SubscriberRepository>,
}

impl UnsubscribeHandler {
    pub fn new(signer: Arc<UnsubscribeSigner>, subscribers: Arc<dyn SubscriberRepository>) -> Self {
        Self {
            signer,
            subscribers,
        }
    }

    /// Repeating an unsubscribe is harmless; the timestamp is refreshed.
    pub async fn handle(&self, cmd: UnsubscribeCommand) -> Result<EmailAddress, UnsubscribeFailure> {
        let (Some(email), Some(token)) = (
            cmd.email.filter(|e| !e.trim().is_empty()),
            cmd.token.filter(|t| !t.trim().is_empty()),
        ) else {
            return Err(UnsubscribeFailure::MissingParameters);
        };

        let address = self.signer.verify_for(token.trim(), &email).map_err(|e| {
            tracing::warn!(reason = %e, "Unsubscribe token rejected");
            UnsubscribeFailure::from(e)
        })?;

        self.subscribers
            .mark_unsubscribed(&address, Timestamp::now())
            .await?;

        tracing::info!("Address unsubscribed");
        Ok(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemorySubscriberRepository;
    use crate::ports::SubscriptionStatus;
    use secrecy::SecretString;

    const SECRET: &str = "unsubscribe-secret-0123456789";

    fn signer(secret: &str) -> Arc<UnsubscribeSigner> {
        Arc::new(UnsubscribeSigner::new(SecretString::new(secret.to_string())))
    }

    fn setup() -> (UnsubscribeHandler, Arc<InMemorySubscriberRepository>) {
        let subscribers = Arc::new(InMemorySubscriberRepository::new());
        (
            UnsubscribeHandler::new(signer(SECRET), subscribers.clone()),
            subscribers,
        )
    }

    fn command(email: &str, token: &str) -> UnsubscribeCommand {
        UnsubscribeCommand {
            email: Some(email.to_string()),
            token: Some(token.to_string()),
        }
    }

    fn token_for(email: &str) -> String {
        signer(SECRET)
            .sign(&EmailAddress::parse(email).unwrap())
            .unwrap()
    }

    #[tokio::test]
    async fn valid_token_unsubscribes_subscriber() {
        let (handler, subscribers) = setup();
        let address = EmailAddress::parse("ann@example.com").unwrap();
        subscribers.subscribe(address.clone()).await;

        let result = handler
            .handle(command("Ann@Example.com", &token_for("ann@example.com")))
            .await
            .unwrap();

        assert_eq!(result, address);
        assert_eq!(
            subscribers.status(&address).await.unwrap(),
            Some(SubscriptionStatus::Unsubscribed)
        );
    }

    #[tokio::test]
    async fn unknown_address_gets_unsubscribed_record() {
        let (handler, subscribers) = setup();
        handler
            .handle(command("new@example.com", &token_for("new@example.com")))
            .await
            .unwrap();
        handler
            .handle(command("new@example.com", &token_for("new@example.com")))
            .await
            .unwrap();

        let address = EmailAddress::parse("new@example.com").unwrap();
        assert_eq!(
            subscribers.status(&address).await.unwrap(),
            Some(SubscriptionStatus::Unsubscribed)
        );
    }

    #[tokio::test]
    async fn token_for_other_address_rejected() {
        let (handler, subscribers) = setup();
        let err = handler
            .handle(command("bob@example.com", &token_for("ann@example.com")))
            .await
            .unwrap_err();

        assert!(matches!(err, UnsubscribeFailure::InvalidToken));
        let bob = EmailAddress::parse("bob@example.com").unwrap();
        assert_eq!(subscribers.status(&bob).await.unwrap(), None);
    }

    #[tokio::test]
    async fn missing_parameters_and_short_secret() {
        let (handler, _) = setup();
        assert!(matches!(
            handler.handle(UnsubscribeCommand::default()).await,
            Err(UnsubscribeFailure::MissingParameters)
        ));

        let weak = UnsubscribeHandler::new(signer("short"), Arc::new(InMemorySubscriberRepository::new()));
        assert!(matches!(
            weak.handle(command("ann@example.com", "a.b")).await,
            Err(UnsubscribeFailure::NotConfigured)
        ));
    }
}
