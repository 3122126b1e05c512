//! Authentication configuration
//!
//! Secrets for session signing and unsubscribe links, the admin allow-list
//! address, cookie scoping, and the shared secret for scheduled cleanup.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Minimum session signing key length in bytes.
pub const MIN_SESSION_SECRET_LEN: usize = 32;

/// Minimum unsubscribe signing key length in bytes.
pub const MIN_UNSUBSCRIBE_SECRET_LEN: usize = 16;

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC key for session tokens
    #[serde(default)]
    pub session_secret: String,

    /// HMAC key for unsubscribe links; falls back to the session secret
    pub unsubscribe_secret: Option<String>,

    /// Single address allowed to request admin login links
    pub admin_email: Option<String>,

    /// Cookie domain; the cookie is host-locked when unset
    pub cookie_domain: Option<String>,

    /// Bearer secret for the cleanup trigger endpoint
    pub cron_secret: Option<String>,

    /// Interval for the in-process magic-link cleanup task
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,
}

impl AuthConfig {
    /// Secret used for unsubscribe tokens.
    pub fn effective_unsubscribe_secret(&self) -> &str {
        self.unsubscribe_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.session_secret)
    }

    /// Admin address, normalized for comparison.
    pub fn admin_email_normalized(&self) -> Option<String> {
        self.admin_email
            .as_deref()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }

    /// Validate authentication configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.session_secret.is_empty() {
            return Err(ValidationError::MissingRequired("AUTH__SESSION_SECRET"));
        }
        if self.session_secret.len() < MIN_SESSION_SECRET_LEN {
            return Err(ValidationError::SessionSecretTooShort(MIN_SESSION_SECRET_LEN));
        }
        if self.effective_unsubscribe_secret().len() < MIN_UNSUBSCRIBE_SECRET_LEN {
            return Err(ValidationError::UnsubscribeSecretTooShort(
                MIN_UNSUBSCRIBE_SECRET_LEN,
            ));
        }
        if let Some(admin) = self.admin_email_normalized() {
            if !admin.contains('@') {
                return Err(ValidationError::InvalidAdminEmail);
            }
        }
        if self.cleanup_interval_secs == 0 {
            return Err(ValidationError::InvalidCleanupInterval);
        }
        Ok(())
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_secret: String::new(),
            unsubscribe_secret: None,
            admin_email: None,
            cookie_domain: None,
            cron_secret: None,
            cleanup_interval_secs: default_cleanup_interval(),
        }
    }
}

fn default_cleanup_interval() -> u64 {
    24 * 60 * 60
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> AuthConfig {
        AuthConfig {
            session_secret: "s".repeat(32),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_session_secret() {
        assert_eq!(
            AuthConfig::default().validate(),
            Err(ValidationError::MissingRequired("AUTH__SESSION_SECRET"))
        );
    }

    #[test]
    fn test_short_session_secret() {
        let config = AuthConfig {
            session_secret: "too-short".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::SessionSecretTooShort(32))
        );
    }

    #[test]
    fn test_unsubscribe_secret_falls_back_to_session_secret() {
        let config = valid();
        assert_eq!(config.effective_unsubscribe_secret(), config.session_secret);

        let config = AuthConfig {
            unsubscribe_secret: Some("u".repeat(16)),
            ..valid()
        };
        assert_eq!(config.effective_unsubscribe_secret(), "u".repeat(16));
    }

    #[test]
    fn test_short_unsubscribe_secret() {
        let config = AuthConfig {
            unsubscribe_secret: Some("short".to_string()),
            ..valid()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::UnsubscribeSecretTooShort(16))
        );
    }

    #[test]
    fn test_admin_email_is_normalized() {
        let config = AuthConfig {
            admin_email: Some("  Owner@NextLevelWeb.ie ".to_string()),
            ..valid()
        };
        assert_eq!(
            config.admin_email_normalized().as_deref(),
            Some("owner@nextlevelweb.ie")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_admin_email_disables_admin_login() {
        let config = AuthConfig {
            admin_email: Some("   ".to_string()),
            ..valid()
        };
        assert!(config.admin_email_normalized().is_none());
    }

    #[test]
    fn test_invalid_admin_email() {
        let config = AuthConfig {
            admin_email: Some("owner".to_string()),
            ..valid()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidAdminEmail));
    }
}
