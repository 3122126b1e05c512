//! LeadRepository port - lead records and their payment state.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EmailAddress, LeadId, Timestamp};
use crate::domain::lead::{Lead, Package, RecordedPayment};

#[async_trait]
pub trait LeadRepository: Send + Sync {
    /// Inserts a new lead.
    async fn save(&self, lead: &Lead) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: LeadId) -> Result<Option<Lead>, DomainError>;

    /// Lead with `id`, only if it belongs to `email`.
    async fn find_owned(&self, id: LeadId, email: &EmailAddress)
        -> Result<Option<Lead>, DomainError>;

    /// Most recently created lead for `email`.
    async fn find_latest_by_email(&self, email: &EmailAddress)
        -> Result<Option<Lead>, DomainError>;

    /// Sets the lead's package. A different package than the stored one
    /// also records the previous value and `at` as a package change.
    /// Returns the updated lead, or a `LeadNotFound` error.
    async fn set_package(&self, id: LeadId, package: Package, at: Timestamp)
        -> Result<Lead, DomainError>;

    /// Applies a confirmed payment in one atomic unit.
    ///
    /// Advances the status (never backwards), increments the running total
    /// with an in-place addition, appends the receipt, and stores the
    /// processor customer id if none is set yet. Returns the updated lead,
    /// or a `LeadNotFound` error.
    async fn record_payment(&self, id: LeadId, payment: &RecordedPayment)
        -> Result<Lead, DomainError>;
}
