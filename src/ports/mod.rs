//! Ports - interfaces to everything outside the domain.
//!
//! Application handlers depend only on these traits; adapters provide
//! PostgreSQL, in-memory, Stripe, Resend and JWT implementations.

mod email_sender;
mod lead_repository;
mod magic_link_repository;
mod payment_provider;
mod processed_event_store;
mod rate_limiter;
mod session_codec;
mod subscriber_repository;

pub use email_sender::{EmailError, EmailMessage, EmailSender};
pub use lead_repository::LeadRepository;
pub use magic_link_repository::{MagicLinkRepository, RedeemOutcome};
pub use payment_provider::{
    CheckoutRequest, CheckoutSession, LineItem, PaymentError, PaymentErrorCode, PaymentProvider,
};
pub use processed_event_store::{ProcessedEventStore, SaveResult};
pub use rate_limiter::{
    RateLimitDenied, RateLimitError, RateLimitKey, RateLimitResult, RateLimitScope,
    RateLimitStatus, RateLimiter,
};
pub use session_codec::SessionCodec;
pub use subscriber_repository::{SubscriberRepository, SubscriptionStatus};
