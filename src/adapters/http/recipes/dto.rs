//! Request and response types for saved recipes.

use serde::{Deserialize, Serialize};

use crate::domain::recipe::SavedRecipe;

/// Body of `POST /api/recipes`.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveRecipeRequest {
    /// Derived from the content when absent.
    pub title: Option<String>,
    pub content: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
}

/// Response of `GET /api/recipes`.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeListResponse {
    pub recipes: Vec<SavedRecipe>,
    pub total: usize,
}

impl From<Vec<SavedRecipe>> for RecipeListResponse {
    fn from(recipes: Vec<SavedRecipe>) -> Self {
        Self {
            total: recipes.len(),
            recipes,
        }
    }
}
