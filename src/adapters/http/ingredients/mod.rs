//! HTTP adapter for ingredient validation and autocomplete.

mod dto;
mod handlers;
mod routes;

pub use dto::{AutocompleteQuery, ValidateIngredientRequest};
pub use handlers::IngredientHandlers;
pub use routes::ingredient_routes;
