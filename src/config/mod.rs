//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `PANTRY_CHEF` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use pantry_chef::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod ai;
mod auth;
mod error;
mod generation;
mod rate_limit;
mod server;

pub use ai::AiConfig;
pub use auth::AuthConfig;
pub use error::{ConfigError, ValidationError};
pub use generation::GenerationConfig;
pub use rate_limit::{RateLimitConfig, WindowOverrides};
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment loads; `validate`
/// decides whether the result is usable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// AI provider configuration (Anthropic or mock)
    #[serde(default)]
    pub ai: AiConfig,

    /// Generation pipeline parameters
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Per-action rate limits
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Session token validation
    #[serde(default)]
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `PANTRY_CHEF` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `PANTRY_CHEF__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `PANTRY_CHEF__RATE_LIMIT__GENERATION__GUEST_LIMIT=5` -> `rate_limit.generation.guest_limit = 5`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PANTRY_CHEF")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
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
        self.ai.validate()?;
        self.generation.validate()?;
        self.rate_limit.validate()?;
        self.auth.validate(&self.server.environment)?;
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
    use crate::application::RelayStrategy;
    use std::env;
    use std::sync::{Mutex, PoisonError};

    // Env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "PANTRY_CHEF__AI__USE_MOCK_PROVIDER",
        "PANTRY_CHEF__AI__ANTHROPIC_API_KEY",
        "PANTRY_CHEF__SERVER__PORT",
        "PANTRY_CHEF__SERVER__ENVIRONMENT",
        "PANTRY_CHEF__GENERATION__RELAY_STRATEGY",
        "PANTRY_CHEF__RATE_LIMIT__GENERATION__GUEST_LIMIT",
    ];

    fn set_minimal_env() {
        env::set_var("PANTRY_CHEF__AI__USE_MOCK_PROVIDER", "true");
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(PoisonError::into_inner);
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert!(config.ai.use_mock_provider);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_server_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(PoisonError::into_inner);
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, Environment::Development);
        assert_eq!(config.generation.relay_strategy, RelayStrategy::Incremental);
    }

    #[test]
    fn test_nested_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(PoisonError::into_inner);
        set_minimal_env();
        env::set_var("PANTRY_CHEF__SERVER__PORT", "3000");
        env::set_var("PANTRY_CHEF__GENERATION__RELAY_STRATEGY", "buffered");
        env::set_var("PANTRY_CHEF__RATE_LIMIT__GENERATION__GUEST_LIMIT", "2");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.generation.relay_strategy, RelayStrategy::Buffered);
        let limits = config.rate_limit.generation_limits();
        assert_eq!(limits.guest_limit, 2);
        assert_eq!(limits.window_secs, 3600);
        assert_eq!(limits.user_limit, 20);
    }

    #[test]
    fn test_missing_key_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(PoisonError::into_inner);
        clear_env();
        let config = AppConfig::load().unwrap();

        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired("ANTHROPIC_API_KEY"))
        ));
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(PoisonError::into_inner);
        set_minimal_env();
        env::set_var("PANTRY_CHEF__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
    }
}
