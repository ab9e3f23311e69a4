//! Single-ingredient validation and autocomplete.

use std::sync::Arc;

use thiserror::Error;

use super::quota::consume_token;
use crate::domain::foundation::ClientIdentity;
use crate::domain::ingredient::{
    AutocompleteSuggestion, IngredientCatalog, IngredientValidationResult,
};
use crate::ports::{RateLimitAction, RateLimitDenied, RateLimitStatus, RateLimiter};

/// A validation answer plus the caller's remaining quota.
#[derive(Debug, Clone)]
pub struct ValidatedIngredient {
    pub result: IngredientValidationResult,
    pub rate_status: Option<RateLimitStatus>,
}

#[derive(Debug, Error)]
pub enum ValidateIngredientError {
    #[error("rate limit exceeded")]
    RateLimited(RateLimitDenied),
}

/// Answers the debounced per-keystroke lookups the client makes while the
/// ingredient list is being typed.
pub struct IngredientLookupHandler {
    limiter: Arc<dyn RateLimiter>,
    catalog: Arc<IngredientCatalog>,
}

impl IngredientLookupHandler {
    pub fn new(limiter: Arc<dyn RateLimiter>, catalog: Arc<IngredientCatalog>) -> Self {
        Self { limiter, catalog }
    }

    /// Matches one ingredient, consuming a validation token.
    pub async fn validate(
        &self,
        identity: &ClientIdentity,
        ingredient: &str,
    ) -> Result<ValidatedIngredient, ValidateIngredientError> {
        let rate_status =
            consume_token(self.limiter.as_ref(), identity, RateLimitAction::Validation)
                .await
                .map_err(ValidateIngredientError::RateLimited)?;

        let result = self.catalog.match_input(ingredient);
        tracing::debug!(
            identity = %identity,
            valid = result.is_valid,
            confidence = result.confidence,
            "Ingredient validated"
        );

        Ok(ValidatedIngredient {
            result,
            rate_status,
        })
    }

    /// Prefix suggestions. Never consumes quota.
    pub fn autocomplete(&self, query: &str, limit: usize) -> Vec<AutocompleteSuggestion> {
        self.catalog.autocomplete(query, limit)
    }
}
