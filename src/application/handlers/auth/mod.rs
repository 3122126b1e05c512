//! Authentication handlers.
//!
//! ## Commands
//! - Request a login link (customer or admin)
//! - Redeem a login link for a session
//! - Clean up expired and used links

mod cleanup_magic_links;
mod redeem_login_link;
mod request_login_link;

pub use cleanup_magic_links::{CleanupMagicLinksHandler, CleanupMagicLinksResult};
pub use redeem_login_link::{
    RedeemLoginLinkCommand, RedeemLoginLinkHandler, RedeemLoginLinkResult,
};
pub use request_login_link::{
    LoginLinkError, RequestLoginLinkCommand, RequestLoginLinkHandler, RequestLoginLinkResult,
};
