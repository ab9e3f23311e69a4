//! Application handlers.
//!
//! Handlers orchestrate domain operations and coordinate between ports.

pub mod generate_recipe;
mod quota;
pub mod validate_ingredient;

pub use generate_recipe::{
    GenerateRecipeCommand, GenerateRecipeConfig, GenerateRecipeError, GenerateRecipeHandler,
    GenerationStarted, RelayStrategy,
};
pub use validate_ingredient::{
    IngredientLookupHandler, ValidateIngredientError, ValidatedIngredient,
};
