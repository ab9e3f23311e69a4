//! Rate limit configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::adapters::rate_limiter::{WindowLimits, DEFAULT_SWEEP_THRESHOLD};

/// Overrides for one action's window; unset fields keep the action's defaults
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct WindowOverrides {
    pub window_secs: Option<u32>,
    pub guest_limit: Option<u32>,
    pub user_limit: Option<u32>,
}

impl WindowOverrides {
    /// Applies the set fields on top of `base`
    pub fn apply(&self, base: WindowLimits) -> WindowLimits {
        WindowLimits {
            window_secs: self.window_secs.unwrap_or(base.window_secs),
            guest_limit: self.guest_limit.unwrap_or(base.guest_limit),
            user_limit: self.user_limit.unwrap_or(base.user_limit),
        }
    }
}

/// Window limits per rate-limited action
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default)]
    pub generation: WindowOverrides,

    #[serde(default)]
    pub validation: WindowOverrides,

    /// Tracked keys before expired windows are purged
    #[serde(default = "default_sweep_threshold")]
    pub sweep_threshold: usize,
}

impl RateLimitConfig {
    /// Effective limits for recipe generation
    pub fn generation_limits(&self) -> WindowLimits {
        self.generation.apply(WindowLimits::generation())
    }

    /// Effective limits for ingredient validation
    pub fn validation_limits(&self) -> WindowLimits {
        self.validation.apply(WindowLimits::validation())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let sections = [
            (self.generation_limits(), "rate_limit.generation.window_secs", "rate_limit.generation limits"),
            (self.validation_limits(), "rate_limit.validation.window_secs", "rate_limit.validation limits"),
        ];
        for (limits, window_field, limit_field) in sections {
            if limits.window_secs == 0 {
                return Err(ValidationError::MustBePositive(window_field));
            }
            if limits.guest_limit == 0 || limits.user_limit == 0 {
                return Err(ValidationError::MustBePositive(limit_field));
            }
        }
        if self.sweep_threshold == 0 {
            return Err(ValidationError::MustBePositive("rate_limit.sweep_threshold"));
        }
        Ok(())
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            generation: WindowOverrides::default(),
            validation: WindowOverrides::default(),
            sweep_threshold: default_sweep_threshold(),
        }
    }
}

fn default_sweep_threshold() -> usize {
    DEFAULT_SWEEP_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = RateLimitConfig::default();
        assert_eq!(config.generation_limits(), WindowLimits::generation());
        assert_eq!(config.validation_limits(), WindowLimits::validation());
        assert_eq!(config.sweep_threshold, 10_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_window_rejected() {
        let mut config = RateLimitConfig::default();
        config.validation.window_secs = Some(0);
        assert_eq!(
            config.validate(),
            Err(ValidationError::MustBePositive("rate_limit.validation.window_secs"))
        );
    }

    #[test]
    fn test_zero_limit_rejected() {
        let mut config = RateLimitConfig::default();
        config.generation.guest_limit = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_override_keeps_other_fields() {
        let config: RateLimitConfig =
            serde_json::from_value(serde_json::json!({ "generation": { "guest_limit": 2 } }))
                .unwrap();

        let limits = config.generation_limits();
        assert_eq!(limits.guest_limit, 2);
        assert_eq!(limits.window_secs, 3600);
        assert_eq!(limits.user_limit, 20);
        assert_eq!(config.validation_limits(), WindowLimits::validation());
    }
}
