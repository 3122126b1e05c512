//! Application layer - Commands, Queries, and Handlers.
//!
//! Handlers orchestrate domain rules over the ports; they hold no state of
//! their own beyond injected settings.

pub mod handlers;

pub use handlers::auth::{
    CleanupMagicLinksHandler, CleanupMagicLinksResult, LoginLinkError, RedeemLoginLinkCommand,
    RedeemLoginLinkHandler, RedeemLoginLinkResult, RequestLoginLinkCommand,
    RequestLoginLinkHandler, RequestLoginLinkResult,
};
pub use handlers::lead::{
    DashboardView, GetDashboardHandler, GetLeadHandler, LeadView, ReceiptView, ResolveLeadHandler,
    ResolveLeadQuery, SelectPackageCommand, SelectPackageError, SelectPackageHandler,
};
pub use handlers::payment::{
    CheckoutError, CheckoutSettings, CreateCheckoutCommand, CreateCheckoutHandler,
    CreateCheckoutResult, HandlePaymentWebhookCommand, HandlePaymentWebhookHandler,
    HandlePaymentWebhookResult,
};
pub use handlers::subscriber::{UnsubscribeCommand, UnsubscribeFailure, UnsubscribeHandler};
