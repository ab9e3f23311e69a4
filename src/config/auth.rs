//! Authentication configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Bearer-token settings. Without a secret every caller is a guest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// HS256 shared secret for session tokens
    pub jwt_secret: Option<Secret<String>>,

    /// Expected `iss` claim
    pub jwt_issuer: Option<String>,

    /// Expected `aud` claim
    pub jwt_audience: Option<String>,
}

impl AuthConfig {
    /// True when session tokens can be validated.
    pub fn is_enabled(&self) -> bool {
        self.jwt_secret
            .as_ref()
            .is_some_and(|s| !s.expose_secret().is_empty())
    }

    /// Validate authentication configuration
    ///
    /// Production deployments must accept accounts.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if *environment == Environment::Production && !self.is_enabled() {
            return Err(ValidationError::MissingRequired("JWT_SECRET"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_by_default() {
        let config = AuthConfig::default();
        assert!(!config.is_enabled());
        assert!(config.validate(&Environment::Development).is_ok());
    }

    #[test]
    fn test_production_requires_secret() {
        let config = AuthConfig::default();
        assert!(config.validate(&Environment::Production).is_err());

        let config = AuthConfig {
            jwt_secret: Some(Secret::new("s3cret".to_string())),
            ..Default::default()
        };
        assert!(config.validate(&Environment::Production).is_ok());
    }
}
