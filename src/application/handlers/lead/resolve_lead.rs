//! ResolveLeadHandler - finds the lead a customer session may act on.

use std::sync::Arc;

use crate::domain::auth::SessionClaims;
use crate::domain::foundation::{DomainError, EmailAddress, LeadId};
use crate::domain::lead::Lead;
use crate::ports::LeadRepository;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveLeadQuery {
    pub email: EmailAddress,
    pub lead_id: Option<LeadId>,
}

impl From<&SessionClaims> for ResolveLeadQuery {
    fn from(claims: &SessionClaims) -> Self {
        Self {
            email: claims.email.clone(),
            lead_id: claims.lead_id,
        }
    }
}

/// A bound lead id must still belong to the session's email; without one
/// the most recently created lead for the email wins.
pub struct ResolveLeadHandler {
    leads: Arc<dyn LeadRepository>,
}

impl ResolveLeadHandler {
    pub fn new(leads: Arc<dyn LeadRepository>) -> Self {
        Self { leads }
    }

    pub async fn handle(&self, query: ResolveLeadQuery) -> Result<Option<Lead>, DomainError> {
        match query.lead_id {
            Some(id) => self.leads.find_owned(id, &query.email).await,
            None => self.leads.find_latest_by_email(&query.email).await,
        }
    }
}
