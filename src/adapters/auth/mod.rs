//! Authentication adapters.
//!
//! - `jwt_session_codec` - HS256 signed session tokens

mod jwt_session_codec;

pub use jwt_session_codec::JwtSessionCodec;
