//! HTTP adapter for saved recipes.

mod dto;
mod handlers;
mod routes;

pub use dto::{RecipeListResponse, SaveRecipeRequest};
pub use handlers::RecipeHandlers;
pub use routes::recipe_routes;
