//! In-Memory Recipe Store Adapter
//!
//! Keeps saved recipes in process memory. Useful for testing and development.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{RecipeId, UserId};
use crate::domain::recipe::SavedRecipe;
use crate::ports::{RecipeRepository, RecipeStoreError};

/// In-memory recipe store, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecipeRepository {
    recipes: Arc<RwLock<Vec<SavedRecipe>>>,
}

impl InMemoryRecipeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored recipes across all owners.
    pub async fn len(&self) -> usize {
        self.recipes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.recipes.read().await.is_empty()
    }
}

#[async_trait]
impl RecipeRepository for InMemoryRecipeRepository {
    async fn save(&self, recipe: &SavedRecipe) -> Result<(), RecipeStoreError> {
        let mut recipes = self.recipes.write().await;
        match recipes.iter_mut().find(|r| r.id == recipe.id) {
            Some(existing) => *existing = recipe.clone(),
            None => recipes.push(recipe.clone()),
        }
        Ok(())
    }

    async fn find(
        &self,
        owner: &UserId,
        id: RecipeId,
    ) -> Result<Option<SavedRecipe>, RecipeStoreError> {
        let recipes = self.recipes.read().await;
        Ok(recipes
            .iter()
            .find(|r| r.id == id && r.is_owned_by(owner))
            .cloned())
    }

    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<SavedRecipe>, RecipeStoreError> {
        let recipes = self.recipes.read().await;
        let mut owned: Vec<SavedRecipe> = recipes
            .iter()
            .rev()
            .filter(|r| r.is_owned_by(owner))
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn delete(&self, owner: &UserId, id: RecipeId) -> Result<(), RecipeStoreError> {
        let mut recipes = self.recipes.write().await;
        let position = recipes
            .iter()
            .position(|r| r.id == id && r.is_owned_by(owner))
            .ok_or(RecipeStoreError::NotFound(id))?;
        recipes.remove(position);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn recipe(owner: &str, content: &str) -> SavedRecipe {
        SavedRecipe::new(user(owner), None, content.to_string(), vec!["tomato".into()]).unwrap()
    }

    #[tokio::test]
    async fn saves_and_finds_owned_recipe() {
        let repo = InMemoryRecipeRepository::new();
        let saved = recipe("alice", "# Soup");
        repo.save(&saved).await.unwrap();

        let found = repo.find(&user("alice"), saved.id).await.unwrap();
        assert_eq!(found, Some(saved.clone()));
        assert_eq!(repo.find(&user("bob"), saved.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn lists_newest_first_per_owner() {
        let repo = InMemoryRecipeRepository::new();
        let first = recipe("alice", "# First");
        let other = recipe("bob", "# Other");
        let second = recipe("alice", "# Second");
        for r in [&first, &other, &second] {
            repo.save(r).await.unwrap();
        }

        let titles: Vec<String> = repo
            .list_for_owner(&user("alice"))
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["Second", "First"]);
    }

    #[tokio::test]
    async fn delete_is_owner_scoped() {
        let repo = InMemoryRecipeRepository::new();
        let saved = recipe("alice", "# Soup");
        repo.save(&saved).await.unwrap();

        assert!(matches!(
            repo.delete(&user("bob"), saved.id).await,
            Err(RecipeStoreError::NotFound(_))
        ));
        repo.delete(&user("alice"), saved.id).await.unwrap();
        assert!(repo.is_empty().await);
    }
}
