//! Ingredient module - vocabulary lookups and input validation.
//!
//! - `IngredientCatalog` - fixed vocabulary, denylist and category table
//! - fuzzy matching (`IngredientCatalog::match_input`) for the validation endpoint
//! - `IngredientList` - the validated input of a generation request
//! - autocomplete ranking for the suggestion endpoint

mod autocomplete;
mod catalog;
mod list;
mod matcher;
mod sanitize;

pub use autocomplete::{AutocompleteSuggestion, DEFAULT_AUTOCOMPLETE_LIMIT, MIN_QUERY_CHARS};
pub use catalog::{IngredientCatalog, DEFAULT_CATEGORY};
pub use list::{
    IngredientList, IngredientListError, IngredientViolation, MAX_INGREDIENTS,
    MAX_INGREDIENT_CHARS, MIN_INGREDIENTS,
};
pub use matcher::{
    edit_distance, similarity, IngredientValidationResult, SUGGESTION_THRESHOLD,
    UNKNOWN_CONFIDENCE,
};
pub use sanitize::normalize_ingredient;
