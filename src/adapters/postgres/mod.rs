//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresLeadRepository` - leads, payment state and receipts
//! - `PostgresMagicLinkRepository` - hashed login links
//! - `PostgresProcessedEventStore` - webhook idempotency markers
//! - `PostgresSubscriberRepository` - email subscription state

mod lead_repository;
mod magic_link_repository;
mod processed_event_store;
mod subscriber_repository;

pub use lead_repository::PostgresLeadRepository;
pub use magic_link_repository::PostgresMagicLinkRepository;
pub use processed_event_store::PostgresProcessedEventStore;
pub use subscriber_repository::PostgresSubscriberRepository;
