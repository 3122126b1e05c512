//! Application configuration module
//!
//! Configuration is read once at process start from environment variables
//! (and a `.env` file when present) using the `config` and `dotenvy` crates.
//! Variables carry the `NEXTLEVEL` prefix and nested values are separated by
//! double underscores.
//!
//! # Example
//!
//! ```no_run
//! use nextlevel_portal::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod auth;
mod database;
mod email;
mod error;
mod payment;
mod rate_limit;
mod server;

pub use auth::{AuthConfig, MIN_SESSION_SECRET_LEN, MIN_UNSUBSCRIBE_SECRET_LEN};
pub use database::DatabaseConfig;
pub use email::EmailConfig;
pub use error::{ConfigError, ValidationError};
pub use payment::PaymentConfig;
pub use rate_limit::RateLimitConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    pub database: DatabaseConfig,

    /// Session, unsubscribe and admin settings
    #[serde(default)]
    pub auth: AuthConfig,

    /// Stripe settings; payments stay disabled when incomplete
    #[serde(default)]
    pub payment: PaymentConfig,

    #[serde(default)]
    pub email: EmailConfig,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// - `NEXTLEVEL__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `NEXTLEVEL__AUTH__SESSION_SECRET=...` -> `auth.session_secret = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("NEXTLEVEL")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.auth.validate()?;
        self.payment.validate()?;
        self.email.validate()?;
        self.rate_limit.validate()?;
        Ok(())
    }

    /// Load and validate in one step.
    pub fn load_validated() -> Result<Self, ConfigError> {
        let config = Self::load()?;
        config.validate()?;
        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
