//! Prompt construction for recipe generation.

use crate::domain::ingredient::IngredientList;

/// Fixed system instruction sent with every generation request.
pub const SYSTEM_INSTRUCTION: &str = "You are a friendly home cook who writes clear, \
practical recipes. Use only common kitchen equipment. Prefer the ingredients the user \
lists; you may assume basic staples such as salt, pepper, oil and water. Answer with \
the recipe only, formatted in Markdown.";

/// Builds the user prompt for a validated ingredient list.
///
/// The response format is fixed: a heading with the title, prep and cook
/// time, servings, an ingredient list, numbered instructions and optional tips.
pub fn build_recipe_prompt(ingredients: &IngredientList) -> String {
    let listed = ingredients
        .as_slice()
        .iter()
        .map(|i| format!("- {}", i))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Create a recipe using these ingredients:\n{listed}\n\n\
Format the recipe exactly like this:\n\
# <Recipe Title>\n\n\
**Prep time:** <minutes>\n\
**Cook time:** <minutes>\n\
**Servings:** <number>\n\n\
## Ingredients\n\
- <quantity> <ingredient>\n\n\
## Instructions\n\
1. <step>\n\n\
## Tips\n\
- <optional tip>"
    )
}
