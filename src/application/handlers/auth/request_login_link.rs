//! RequestLoginLinkHandler - issues a magic link and emails it.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::auth::{MagicLink, Role, MAGIC_LINK_TTL_MINUTES};
use crate::domain::foundation::{DomainError, EmailAddress, Timestamp};
use crate::ports::{EmailError, EmailMessage, EmailSender, LeadRepository, MagicLinkRepository};

/// Command to request a login link.
#[derive(Debug, Clone)]
pub struct RequestLoginLinkCommand {
    /// Address as typed by the visitor; normalized here.
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLoginLinkResult {
    pub email: EmailAddress,
    pub expires_at: Timestamp,
}

#[derive(Debug, Error)]
pub enum LoginLinkError {
    #[error("Email is required")]
    MissingEmail,

    #[error("Invalid email address")]
    InvalidEmail,

    /// Customer login is for people who already submitted the contact form.
    #[error("No account found with this email. Submit the contact form first.")]
    NoAccount,

    #[error("Invalid email")]
    NotAdmin,

    #[error("Admin login not configured")]
    AdminNotConfigured,

    #[error("Could not send email. Try again later.")]
    DeliveryFailed(#[source] EmailError),

    #[error("Server error")]
    Storage(#[from] DomainError),
}

/// Handler for login-link requests from both login pages.
///
/// Admin links go only to the single configured admin address; customer
/// links only to addresses that have a lead.
pub struct RequestLoginLinkHandler {
    links: Arc<dyn MagicLinkRepository>,
    leads: Arc<dyn LeadRepository>,
    email_sender: Arc<dyn EmailSender>,
    admin_email: Option<EmailAddress>,
    base_url: String,
}

impl RequestLoginLinkHandler {
    pub fn new(
        links: Arc<dyn MagicLinkRepository>,
        leads: Arc<dyn LeadRepository>,
        email_sender: Arc<dyn EmailSender>,
        admin_email: Option<EmailAddress>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            links,
            leads,
            email_sender,
            admin_email,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn handle(
        &self,
        cmd: RequestLoginLinkCommand,
    ) -> Result<RequestLoginLinkResult, LoginLinkError> {
        if cmd.role == Role::Admin && self.admin_email.is_none() {
            return Err(LoginLinkError::AdminNotConfigured);
        }

        if cmd.email.trim().is_empty() {
            return Err(LoginLinkError::MissingEmail);
        }
        let email = EmailAddress::parse(&cmd.email).map_err(|_| LoginLinkError::InvalidEmail)?;

        match cmd.role {
            Role::Admin => {
                if self.admin_email.as_ref() != Some(&email) {
                    tracing::warn!("Admin login link requested for a non-admin address");
                    return Err(LoginLinkError::NotAdmin);
                }
            }
            Role::Customer => {
                if self.leads.find_latest_by_email(&email).await?.is_none() {
                    return Err(LoginLinkError::NoAccount);
                }
            }
        }

        let (token, link) = MagicLink::issue(email.clone(), cmd.role, Timestamp::now());
        self.links.insert(&link).await?;

        let url = format!("{}/api/auth/verify?token={}", self.base_url, token.as_str());
        self.email_sender
            .send(&login_email(email.clone(), &url))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, role = %cmd.role, "Failed to send login link");
                LoginLinkError::DeliveryFailed(e)
            })?;

        tracing::info!(role = %cmd.role, "Login link issued");
        Ok(RequestLoginLinkResult {
            email,
            expires_at: link.expires_at,
        })
    }
}

fn login_email(to: EmailAddress, url: &str) -> EmailMessage {
    EmailMessage::new(
        to,
        "Your login link for Next Level Web",
        format!(
            "<p>Hi,</p>\
             <p>Use the link below to sign in. This link expires in {} minutes and can only be used once.</p>\
             <p><a href=\"{url}\">Sign in</a></p>\
             <p>If you didn't request this, you can ignore this email.</p>\
             <p>Next Level Web</p>",
            MAGIC_LINK_TTL_MINUTES
        ),
    )
}
