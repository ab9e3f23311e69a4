//! HTTP routes for ingredient endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{autocomplete, validate_ingredient, IngredientHandlers};

pub fn ingredient_routes(handlers: IngredientHandlers) -> Router {
    Router::new()
        .route("/api/ingredients/validate", post(validate_ingredient))
        .route("/api/ingredients/autocomplete", get(autocomplete))
        .with_state(handlers)
}
