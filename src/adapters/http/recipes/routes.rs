//! HTTP routes for saved recipes.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{delete_recipe, get_recipe, list_recipes, save_recipe, RecipeHandlers};

pub fn recipe_routes(handlers: RecipeHandlers) -> Router {
    Router::new()
        .route("/api/recipes", post(save_recipe).get(list_recipes))
        .route("/api/recipes/:id", get(get_recipe).delete(delete_recipe))
        .with_state(handlers)
}
