//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `ingredient` - Ingredient catalog, fuzzy matching and list validation
//! - `recipe` - Prompt building, stream events, SSE framing and saved recipes

pub mod foundation;
pub mod ingredient;
pub mod recipe;
