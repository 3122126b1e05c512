//! SelectPackageHandler - lets a customer pick their package from the dashboard.

use std::sync::Arc;

use thiserror::Error;

use super::{ResolveLeadHandler, ResolveLeadQuery};
use crate::domain::auth::SessionClaims;
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp};
use crate::domain::lead::{Lead, Package};
use crate::ports::LeadRepository;

#[derive(Debug, Clone)]
pub struct SelectPackageCommand {
    pub session: SessionClaims,
    pub package: Package,
}

#[derive(Debug, Error)]
pub enum SelectPackageError {
    #[error("Invalid package")]
    NotSelectable(Package),

    #[error("Lead not found")]
    LeadNotFound,

    #[error("Server error")]
    Storage(#[from] DomainError),
}

pub struct SelectPackageHandler {
    resolver: ResolveLeadHandler,
    leads: Arc<dyn LeadRepository>,
}

impl SelectPackageHandler {
    pub fn new(resolver: ResolveLeadHandler, leads: Arc<dyn LeadRepository>) -> Self {
        Self { resolver, leads }
    }

    pub async fn handle(&self, cmd: SelectPackageCommand) -> Result<Lead, SelectPackageError> {
        if !cmd.package.is_self_selectable() {
            return Err(SelectPackageError::NotSelectable(cmd.package));
        }

        let lead = self
            .resolver
            .handle(ResolveLeadQuery::from(&cmd.session))
            .await?
            .ok_or(SelectPackageError::LeadNotFound)?;

        let previous = lead.package;
        let updated = self
            .leads
            .set_package(lead.id, cmd.package, Timestamp::now())
            .await
            .map_err(|e| match e.code {
                ErrorCode::LeadNotFound => SelectPackageError::LeadNotFound,
                _ => SelectPackageError::Storage(e),
            })?;

        tracing::info!(
            lead_id = %updated.id,
            from = previous.map(|p| p.as_str()).unwrap_or("none"),
            to = %cmd.package,
            "Customer selected package"
        );

        Ok(updated)
    }
}
