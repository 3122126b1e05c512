//! RedeemLoginLinkHandler - exchanges a magic link for a signed session.

use std::sync::Arc;

use crate::domain::auth::{LoginFailureReason, LoginToken, Role, SessionClaims, SessionError};
use crate::domain::foundation::{EmailAddress, LeadId, Timestamp};
use crate::ports::{LeadRepository, MagicLinkRepository, RedeemOutcome, SessionCodec};

#[derive(Debug, Clone)]
pub struct RedeemLoginLinkCommand {
    /// `token` query parameter, if any.
    pub token: Option<String>,
}

/// Outcome of a redemption. Failures carry the reason code and the login
/// page to send the visitor back to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedeemLoginLinkResult {
    SignedIn {
        claims: SessionClaims,
        session_token: String,
    },
    Failed {
        reason: LoginFailureReason,
        role: Role,
    },
}

impl RedeemLoginLinkResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, RedeemLoginLinkResult::SignedIn { .. })
    }

    /// Where the browser goes next.
    pub fn redirect_path(&self) -> String {
        match self {
            RedeemLoginLinkResult::SignedIn { claims, .. } => claims.role.home_path().to_string(),
            RedeemLoginLinkResult::Failed { reason, role } => {
                format!("{}?error={}", role.login_path(), reason.as_code())
            }
        }
    }

    fn failed(reason: LoginFailureReason, role: Role) -> Self {
        RedeemLoginLinkResult::Failed { reason, role }
    }
}

pub struct RedeemLoginLinkHandler {
    links: Arc<dyn MagicLinkRepository>,
    leads: Arc<dyn LeadRepository>,
    codec: Arc<dyn SessionCodec>,
}

impl RedeemLoginLinkHandler {
    pub fn new(
        links: Arc<dyn MagicLinkRepository>,
        leads: Arc<dyn LeadRepository>,
        codec: Arc<dyn SessionCodec>,
    ) -> Self {
        Self {
            links,
            leads,
            codec,
        }
    }

    pub async fn handle(&self, cmd: RedeemLoginLinkCommand) -> RedeemLoginLinkResult {
        self.handle_at(cmd, Timestamp::now()).await
    }

    /// Redemption never errors: every failure becomes a reason code.
    pub async fn handle_at(&self, cmd: RedeemLoginLinkCommand, now: Timestamp) -> RedeemLoginLinkResult {
        let Some(raw) = cmd.token.filter(|t| !t.trim().is_empty()) else {
            return RedeemLoginLinkResult::failed(LoginFailureReason::Missing, Role::Customer);
        };
        let token = LoginToken::from_presented(raw.trim());

        let redeemed = match self.links.redeem(&token.hash(), now).await {
            Ok(RedeemOutcome::Redeemed(link)) => link,
            Ok(RedeemOutcome::Rejected(failure)) => {
                tracing::info!(reason = failure.reason().as_code(), "Login link rejected");
                return RedeemLoginLinkResult::failed(failure.reason(), failure.role());
            }
            Err(e) => {
                tracing::error!(error = %e, "Login link redemption failed");
                return RedeemLoginLinkResult::failed(LoginFailureReason::Server, Role::Customer);
            }
        };

        let lead_id = match redeemed.role {
            Role::Customer => self.bind_lead(&redeemed.email).await,
            Role::Admin => None,
        };
        let claims = SessionClaims::new(redeemed.email, redeemed.role, lead_id, now);

        match self.codec.issue(&claims) {
            Ok(session_token) => {
                tracing::info!(role = %claims.role, lead_id = ?claims.lead_id, "Session established");
                RedeemLoginLinkResult::SignedIn {
                    claims,
                    session_token,
                }
            }
            Err(SessionError::NotConfigured { .. }) => {
                tracing::error!("Session signing key is not configured");
                RedeemLoginLinkResult::failed(LoginFailureReason::Config, claims.role)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to sign session");
                RedeemLoginLinkResult::failed(LoginFailureReason::Server, claims.role)
            }
        }
    }

    /// Most recent lead for the address; a lookup failure leaves the
    /// session unbound and lead resolution falls back to the email.
    async fn bind_lead(&self, email: &EmailAddress) -> Option<LeadId> {
        match self.leads.find_latest_by_email(email).await {
            Ok(lead) => lead.map(|l| l.id),
            Err(e) => {
                tracing::warn!(error = %e, "Could not bind lead to session");
                None
            }
        }
    }
}
