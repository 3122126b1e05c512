//! GetLeadHandler - admin lookup of any lead by id.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, LeadId};
use crate::ports::LeadRepository;

use super::LeadView;

pub struct GetLeadHandler {
    leads: Arc<dyn LeadRepository>,
}

impl GetLeadHandler {
    pub fn new(leads: Arc<dyn LeadRepository>) -> Self {
        Self { leads }
    }

    pub async fn handle(&self, id: LeadId) -> Result<Option<LeadView>, DomainError> {
        Ok(self.leads.find_by_id(id).await?.as_ref().map(LeadView::from))
    }
}
