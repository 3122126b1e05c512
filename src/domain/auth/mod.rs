//! Authentication domain: roles, session claims, magic links and the
//! token codecs that protect them.

mod magic_link;
mod role;
mod session;
mod token;
mod unsubscribe;

pub use magic_link::{
    LoginFailureReason, MagicLink, RedeemFailure, RedeemedLink, MAGIC_LINK_TTL_MINUTES,
};
pub use role::Role;
pub use session::{SessionClaims, SessionError, SESSION_TTL_DAYS};
pub use token::{LoginToken, TokenHash, TOKEN_BYTES};
pub use unsubscribe::{UnsubscribeError, UnsubscribeSigner};
