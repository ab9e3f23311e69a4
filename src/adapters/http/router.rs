//! Top-level router assembly.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use super::generation::{generation_routes, GenerationHandlers};
use super::ingredients::{ingredient_routes, IngredientHandlers};
use super::middleware::{auth_middleware, AuthState};
use super::recipes::{recipe_routes, RecipeHandlers};
use crate::application::{GenerateRecipeHandler, IngredientLookupHandler};
use crate::ports::{RecipeRepository, SessionValidator};

/// Everything the HTTP surface needs, already wired.
#[derive(Clone)]
pub struct AppServices {
    pub generate: Arc<GenerateRecipeHandler>,
    pub lookup: Arc<IngredientLookupHandler>,
    pub recipes: Arc<dyn RecipeRepository>,
    /// `None` disables bearer tokens; every caller is then a guest.
    pub sessions: Option<Arc<dyn SessionValidator>>,
    /// Applied to every route except the generation stream.
    pub request_timeout: Duration,
    /// Empty allows any origin.
    pub cors_origins: Vec<String>,
}

/// Builds the application router.
///
/// ```text
/// /health                         GET
/// /api/generate                   POST   (SSE, no timeout)
/// /api/ingredients/validate       POST
/// /api/ingredients/autocomplete   GET
/// /api/recipes                    POST, GET      (auth)
/// /api/recipes/:id                GET, DELETE    (auth)
/// ```
pub fn build_router(services: AppServices) -> Router {
    let bounded = Router::new()
        .route("/health", get(health))
        .merge(ingredient_routes(IngredientHandlers::new(services.lookup)))
        .merge(recipe_routes(RecipeHandlers::new(services.recipes)))
        .layer(TimeoutLayer::new(services.request_timeout));

    let mut app = Router::new()
        .merge(generation_routes(GenerationHandlers::new(services.generate)))
        .merge(bounded);

    if let Some(validator) = services.sessions {
        let state: AuthState = validator;
        app = app.layer(middleware::from_fn_with_state(state, auth_middleware));
    }

    app.layer(cors_layer(&services.cors_origins))
        .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str {
    "ok"
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .filter_map(|origin| HeaderValue::from_str(origin).ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([
            HeaderName::from_static("x-ratelimit-limit"),
            HeaderName::from_static("x-ratelimit-remaining"),
            HeaderName::from_static("x-ratelimit-reset"),
            HeaderName::from_static("x-request-id"),
            header::RETRY_AFTER,
        ])
}
