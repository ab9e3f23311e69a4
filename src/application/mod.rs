//! Application layer - Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::{
    GenerateRecipeCommand, GenerateRecipeConfig, GenerateRecipeError, GenerateRecipeHandler,
    GenerationStarted, IngredientLookupHandler, RelayStrategy, ValidateIngredientError,
    ValidatedIngredient,
};
