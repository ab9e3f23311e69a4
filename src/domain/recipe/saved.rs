use serde::{Deserialize, Serialize};

use crate::domain::foundation::{RecipeId, Timestamp, UserId, ValidationError};

use super::title::extract_title;

pub const UNTITLED_RECIPE: &str = "Untitled Recipe";
const MAX_TITLE_CHARS: usize = 200;

/// A generated recipe the owner chose to keep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedRecipe {
    pub id: RecipeId,
    pub owner: UserId,
    pub title: String,
    pub content: String,
    pub ingredients: Vec<String>,
    pub created_at: Timestamp,
}

impl SavedRecipe {
    /// Creates a recipe, deriving the title from the content when none is given.
    pub fn new(
        owner: UserId,
        title: Option<String>,
        content: String,
        ingredients: Vec<String>,
    ) -> Result<Self, ValidationError> {
        if content.trim().is_empty() {
            return Err(ValidationError::empty_field("content"));
        }

        let title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .or_else(|| extract_title(&content))
            .unwrap_or_else(|| UNTITLED_RECIPE.to_string());
        if title.chars().count() > MAX_TITLE_CHARS {
            return Err(ValidationError::invalid_format(
                "title",
                format!("must be at most {} characters", MAX_TITLE_CHARS),
            ));
        }

        Ok(Self {
            id: RecipeId::new(),
            owner,
            title,
            content,
            ingredients,
            created_at: Timestamp::now(),
        })
    }

    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.owner == user
    }
}
