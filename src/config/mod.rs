//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `ESTIMATEX` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use estimatex::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}:{}", config.server.host, config.server.port);
//! ```

mod auth;
mod error;
mod events;
mod redis;
mod server;

pub use auth::{AuthConfig, MIN_PRODUCTION_SECRET_BYTES};
pub use error::{ConfigError, ValidationError};
pub use events::EventsConfig;
pub use redis::RedisConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Redis configuration. Without it rooms live in process memory.
    #[serde(default)]
    pub redis: Option<RedisConfig>,

    /// Room credential configuration
    pub auth: AuthConfig,

    /// Event fanout configuration
    #[serde(default)]
    pub events: EventsConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `ESTIMATEX` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `ESTIMATEX__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `ESTIMATEX__AUTH__JWT_SECRET=...` -> `auth.jwt_secret = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("ESTIMATEX")
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
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        if let Some(redis) = &self.redis {
            redis.validate()?;
        }
        self.auth.validate(&self.server.environment)?;
        self.events.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global; tests touching them run one at a time
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 5] = [
        "ESTIMATEX__AUTH__JWT_SECRET",
        "ESTIMATEX__REDIS__URL",
        "ESTIMATEX__SERVER__PORT",
        "ESTIMATEX__SERVER__ENVIRONMENT",
        "ESTIMATEX__EVENTS__PUSH_CHANNEL_CAPACITY",
    ];

    fn load_with(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        for (key, value) in vars {
            env::set_var(key, value);
        }
        let result = AppConfig::load();
        for key in VARS {
            env::remove_var(key);
        }
        result
    }

    #[test]
    fn test_load_minimal_environment() {
        let config = load_with(&[("ESTIMATEX__AUTH__JWT_SECRET", "dev-secret")]).unwrap();

        assert_eq!(config.auth.jwt_secret.expose_secret(), "dev-secret");
        assert_eq!(config.auth.token_ttl_secs, 86_400);
        assert!(config.redis.is_none());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.events.push_channel_capacity, 64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_redis_section() {
        let config = load_with(&[
            ("ESTIMATEX__AUTH__JWT_SECRET", "dev-secret"),
            ("ESTIMATEX__REDIS__URL", "redis://localhost:6379"),
        ])
        .unwrap();

        let redis = config.redis.unwrap();
        assert_eq!(redis.url, "redis://localhost:6379");
        assert_eq!(redis.key_prefix, "estimatex:");
    }

    #[test]
    fn test_missing_secret_fails_to_load() {
        assert!(load_with(&[]).is_err());
    }

    #[test]
    fn test_custom_values_are_parsed() {
        let config = load_with(&[
            ("ESTIMATEX__AUTH__JWT_SECRET", "dev-secret"),
            ("ESTIMATEX__SERVER__PORT", "3000"),
            ("ESTIMATEX__EVENTS__PUSH_CHANNEL_CAPACITY", "8"),
        ])
        .unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.events.push_channel_capacity, 8);
    }

    #[test]
    fn test_production_requires_long_secret() {
        let config = load_with(&[
            ("ESTIMATEX__AUTH__JWT_SECRET", "short"),
            ("ESTIMATEX__SERVER__ENVIRONMENT", "production"),
        ])
        .unwrap();

        assert!(config.is_production());
        assert_eq!(
            config.validate(),
            Err(ValidationError::JwtSecretTooShort(MIN_PRODUCTION_SECRET_BYTES))
        );
    }
}
