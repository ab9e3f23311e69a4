//! RecipeRepository port for saved recipe persistence.

use async_trait::async_trait;

use crate::domain::foundation::{RecipeId, UserId};
use crate::domain::recipe::SavedRecipe;

/// Errors from the recipe store.
#[derive(Debug, thiserror::Error)]
pub enum RecipeStoreError {
    #[error("recipe {0} not found")]
    NotFound(RecipeId),

    #[error("recipe store unavailable: {0}")]
    Unavailable(String),
}

/// Repository for recipes saved by authenticated users.
///
/// Every read and delete is scoped to the owner; another user's recipe is
/// reported as not found.
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Persist a new recipe.
    async fn save(&self, recipe: &SavedRecipe) -> Result<(), RecipeStoreError>;

    /// Find a recipe owned by `owner`.
    async fn find(&self, owner: &UserId, id: RecipeId) -> Result<Option<SavedRecipe>, RecipeStoreError>;

    /// All recipes of `owner`, newest first.
    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<SavedRecipe>, RecipeStoreError>;

    /// Delete a recipe owned by `owner`.
    async fn delete(&self, owner: &UserId, id: RecipeId) -> Result<(), RecipeStoreError>;
}
