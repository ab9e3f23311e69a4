//! Generation pipeline configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::application::{GenerateRecipeConfig, RelayStrategy};

/// Provider parameters and relay behaviour for recipe generation
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// `incremental` (chunk per delta) or `buffered` (single complete event)
    #[serde(default)]
    pub relay_strategy: RelayStrategy,

    /// Upper bound on generated tokens
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Events buffered between the relay task and a slow client
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl GenerationConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_output_tokens == 0 {
            return Err(ValidationError::MustBePositive("max_output_tokens"));
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(ValidationError::InvalidTemperature);
        }
        if self.channel_capacity == 0 {
            return Err(ValidationError::MustBePositive("channel_capacity"));
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            relay_strategy: RelayStrategy::default(),
            max_output_tokens: default_max_output_tokens(),
            temperature: default_temperature(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl From<&GenerationConfig> for GenerateRecipeConfig {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            relay_strategy: config.relay_strategy,
            max_output_tokens: config.max_output_tokens,
            temperature: config.temperature,
            channel_capacity: config.channel_capacity,
        }
    }
}

fn default_max_output_tokens() -> u32 {
    2048
}

fn default_temperature() -> f32 {
    0.7
}

fn default_channel_capacity() -> usize {
    32
}
