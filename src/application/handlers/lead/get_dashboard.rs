//! GetDashboardHandler - the customer's home view.

use serde::Serialize;

use crate::domain::auth::SessionClaims;
use crate::domain::foundation::DomainError;

use super::{LeadView, ResolveLeadHandler, ResolveLeadQuery};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub email: String,
    /// `None` until the customer's lead can be resolved.
    pub lead: Option<LeadView>,
    pub payments_enabled: bool,
}

pub struct GetDashboardHandler {
    resolver: ResolveLeadHandler,
    payments_enabled: bool,
}

impl GetDashboardHandler {
    pub fn new(resolver: ResolveLeadHandler, payments_enabled: bool) -> Self {
        Self {
            resolver,
            payments_enabled,
        }
    }

    pub async fn handle(&self, session: &SessionClaims) -> Result<DashboardView, DomainError> {
        let lead = self.resolver.handle(ResolveLeadQuery::from(session)).await?;
        Ok(DashboardView {
            email: session.email.as_str().to_string(),
            lead: lead.as_ref().map(LeadView::from),
            payments_enabled: self.payments_enabled,
        })
    }
}
