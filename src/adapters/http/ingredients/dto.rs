//! Request types for the ingredient endpoints.

use serde::Deserialize;

/// Body of `POST /api/ingredients/validate`.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidateIngredientRequest {
    pub ingredient: String,
}

/// Query of `GET /api/ingredients/autocomplete`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AutocompleteQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
}
