//! Rate limiting port.
//!
//! Fixed-window counters keyed by scope and identifier. The login-link
//! limiter is per-process by requirement; nothing here assumes a shared
//! backend.

use async_trait::async_trait;
use std::fmt;

use crate::domain::foundation::Timestamp;

#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Counts one request against `key`, or denies it.
    async fn check(&self, key: RateLimitKey) -> Result<RateLimitResult, RateLimitError>;

    /// Drops windows that have ended; returns how many were removed.
    async fn prune(&self) -> usize;
}

/// Key identifying what to rate limit.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct RateLimitKey {
    pub scope: RateLimitScope,
    /// e.g. a client IP address
    pub identifier: String,
}

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum RateLimitScope {
    /// Requests for login links, per client IP.
    LoginLink,
}

impl RateLimitKey {
    pub fn login_link(ip: &str) -> Self {
        Self {
            scope: RateLimitScope::LoginLink,
            identifier: ip.to_string(),
        }
    }

    pub fn storage_key(&self) -> String {
        format!("ratelimit:{}:{}", self.scope.as_str(), self.identifier)
    }
}

impl RateLimitScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateLimitScope::LoginLink => "login_link",
        }
    }
}

impl fmt::Display for RateLimitScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone)]
pub enum RateLimitResult {
    Allowed(RateLimitStatus),
    Denied(RateLimitDenied),
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed(_))
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, RateLimitResult::Denied(_))
    }
}

#[derive(Debug, Clone)]
pub struct RateLimitStatus {
    pub limit: u32,
    pub remaining: u32,
    pub reset_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct RateLimitDenied {
    pub limit: u32,
    /// Seconds until the window resets; at least 1.
    pub retry_after_secs: u64,
    pub scope: RateLimitScope,
}

#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("rate limiter unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_link_key() {
        let key = RateLimitKey::login_link("192.168.1.1");
        assert_eq!(key.scope, RateLimitScope::LoginLink);
        assert_eq!(key.storage_key(), "ratelimit:login_link:192.168.1.1");
    }

    #[test]
    fn result_predicates() {
        let allowed = RateLimitResult::Allowed(RateLimitStatus {
            limit: 5,
            remaining: 4,
            reset_at: Timestamp::now(),
        });
        assert!(allowed.is_allowed());
        assert!(!allowed.is_denied());

        let denied = RateLimitResult::Denied(RateLimitDenied {
            limit: 5,
            retry_after_secs: 30,
            scope: RateLimitScope::LoginLink,
        });
        assert!(denied.is_denied());
    }
}
