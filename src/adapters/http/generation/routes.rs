//! HTTP routes for recipe generation.

use axum::{routing::post, Router};

use super::handlers::{generate_recipe, GenerationHandlers};

/// Creates the generation router. No request timeout: the response is a
/// long-lived stream.
pub fn generation_routes(handlers: GenerationHandlers) -> Router {
    Router::new()
        .route("/api/generate", post(generate_recipe))
        .with_state(handlers)
}
