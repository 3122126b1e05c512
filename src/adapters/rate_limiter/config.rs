//! Limits applied by the in-memory rate limiter.

use crate::config::RateLimitConfig;
use crate::ports::RateLimitScope;

/// Fixed-window limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowLimit {
    pub max_requests: u32,
    pub window_secs: u64,
}

/// Per-scope limits.
#[derive(Debug, Clone)]
pub struct RateLimits {
    pub login_link: WindowLimit,
}

impl RateLimits {
    pub fn for_scope(&self, scope: RateLimitScope) -> WindowLimit {
        match scope {
            RateLimitScope::LoginLink => self.login_link,
        }
    }
}

impl Default for RateLimits {
    /// Five login-link requests per fifteen minutes.
    fn default() -> Self {
        Self {
            login_link: WindowLimit {
                max_requests: 5,
                window_secs: 15 * 60,
            },
        }
    }
}

impl From<&RateLimitConfig> for RateLimits {
    fn from(config: &RateLimitConfig) -> Self {
        Self {
            login_link: WindowLimit {
                max_requests: config.login_link_max_requests,
                window_secs: config.login_link_window_secs,
            },
        }
    }
}
