//! HTTP handlers for saved recipe endpoints. All require authentication.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::dto::{RecipeListResponse, SaveRecipeRequest};
use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::RequireAuth;
use crate::domain::foundation::RecipeId;
use crate::domain::recipe::SavedRecipe;
use crate::ports::RecipeRepository;

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct RecipeHandlers {
    repository: Arc<dyn RecipeRepository>,
}

impl RecipeHandlers {
    pub fn new(repository: Arc<dyn RecipeRepository>) -> Self {
        Self { repository }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/recipes - Save a generated recipe
pub async fn save_recipe(
    State(handlers): State<RecipeHandlers>,
    RequireAuth(user): RequireAuth,
    payload: Result<Json<SaveRecipeRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload?;
    let recipe = SavedRecipe::new(user.id, req.title, req.content, req.ingredients)?;
    handlers.repository.save(&recipe).await?;

    tracing::info!(recipe_id = %recipe.id, owner = %recipe.owner, "Recipe saved");
    Ok((StatusCode::CREATED, Json(recipe)).into_response())
}

/// GET /api/recipes - List the caller's recipes, newest first
pub async fn list_recipes(
    State(handlers): State<RecipeHandlers>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<RecipeListResponse>, ApiError> {
    let recipes = handlers.repository.list_for_owner(&user.id).await?;
    Ok(Json(recipes.into()))
}

/// GET /api/recipes/:id - Get one of the caller's recipes
pub async fn get_recipe(
    State(handlers): State<RecipeHandlers>,
    RequireAuth(user): RequireAuth,
    Path(recipe_id): Path<String>,
) -> Result<Json<SavedRecipe>, ApiError> {
    let recipe_id = parse_recipe_id(&recipe_id)?;
    handlers
        .repository
        .find(&user.id, recipe_id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Recipe"))
}

/// DELETE /api/recipes/:id - Delete one of the caller's recipes
pub async fn delete_recipe(
    State(handlers): State<RecipeHandlers>,
    RequireAuth(user): RequireAuth,
    Path(recipe_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let recipe_id = parse_recipe_id(&recipe_id)?;
    handlers.repository.delete(&user.id, recipe_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn parse_recipe_id(raw: &str) -> Result<RecipeId, ApiError> {
    raw.parse::<RecipeId>()
        .map_err(|_| ApiError::BadRequest("Invalid recipe ID".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_id_is_bad_request() {
        let err = parse_recipe_id("not-a-uuid").unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn uuid_parses() {
        let id = RecipeId::new();
        assert_eq!(parse_recipe_id(&id.to_string()).unwrap(), id);
    }
}
