//! In-memory storage adapters for tests and local development.

mod lead_repository;
mod magic_link_repository;
mod processed_event_store;
mod subscriber_repository;

pub use lead_repository::InMemoryLeadRepository;
pub use magic_link_repository::InMemoryMagicLinkRepository;
pub use processed_event_store::InMemoryProcessedEventStore;
pub use subscriber_repository::InMemorySubscriberRepository;
