//! Login-link rate limit configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Per-IP limit applied to the login-link endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_max_requests")]
    pub login_link_max_requests: u32,

    #[serde(default = "default_window_secs")]
    pub login_link_window_secs: u64,
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.login_link_window_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.login_link_max_requests == 0 || self.login_link_window_secs == 0 {
            return Err(ValidationError::InvalidRateLimit);
        }
        Ok(())
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            login_link_max_requests: default_max_requests(),
            login_link_window_secs: default_window_secs(),
        }
    }
}

fn default_max_requests() -> u32 {
    5
}

fn default_window_secs() -> u64 {
    15 * 60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RateLimitConfig::default();
        assert_eq!(config.login_link_max_requests, 5);
        assert_eq!(config.window(), Duration::from_secs(900));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_values_rejected() {
        let config = RateLimitConfig {
            login_link_max_requests: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidRateLimit));
    }
}
