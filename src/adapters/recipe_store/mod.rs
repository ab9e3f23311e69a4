//! Recipe store adapters.

mod in_memory;

pub use in_memory::InMemoryRecipeRepository;
