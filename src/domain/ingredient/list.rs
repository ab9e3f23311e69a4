//! The validated ingredient list submitted for generation.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use super::catalog::IngredientCatalog;
use super::sanitize::normalize_ingredient;

pub const MIN_INGREDIENTS: usize = 3;
pub const MAX_INGREDIENTS: usize = 15;
pub const MAX_INGREDIENT_CHARS: usize = 50;

/// One broken constraint on a submitted list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IngredientViolation {
    TooFew { min: usize, actual: usize },
    TooMany { max: usize, actual: usize },
    Empty { index: usize },
    TooLong { index: usize, max: usize, actual: usize },
    Duplicate { value: String },
    NotFood { value: String },
}

impl fmt::Display for IngredientViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFew { min, actual } => {
                write!(f, "at least {} ingredients are required, got {}", min, actual)
            }
            Self::TooMany { max, actual } => {
                write!(f, "at most {} ingredients are allowed, got {}", max, actual)
            }
            Self::Empty { index } => write!(f, "ingredient {} is empty", index + 1),
            Self::TooLong { index, max, actual } => write!(
                f,
                "ingredient {} is {} characters long (max {})",
                index + 1,
                actual,
                max
            ),
            Self::Duplicate { value } => write!(f, "'{}' is listed more than once", value),
            Self::NotFood { value } => write!(f, "'{}' is not a food ingredient", value),
        }
    }
}

/// Every constraint the submitted list violated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid ingredient list: {}", summarize(.violations))]
pub struct IngredientListError {
    pub violations: Vec<IngredientViolation>,
}

fn summarize(violations: &[IngredientViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl IngredientListError {
    pub fn has_duplicate(&self) -> bool {
        self.violations
            .iter()
            .any(|v| matches!(v, IngredientViolation::Duplicate { .. }))
    }
}

/// Normalized, unique ingredients in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IngredientList(Vec<String>);

impl IngredientList {
    /// Normalizes and checks a raw list, collecting every violation.
    pub fn parse<S: AsRef<str>>(
        raw: &[S],
        catalog: &IngredientCatalog,
    ) -> Result<Self, IngredientListError> {
        let mut violations = Vec::new();

        if raw.len() < MIN_INGREDIENTS {
            violations.push(IngredientViolation::TooFew {
                min: MIN_INGREDIENTS,
                actual: raw.len(),
            });
        }
        if raw.len() > MAX_INGREDIENTS {
            violations.push(IngredientViolation::TooMany {
                max: MAX_INGREDIENTS,
                actual: raw.len(),
            });
        }

        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        let mut items = Vec::with_capacity(raw.len());

        for (index, item) in raw.iter().enumerate() {
            let normalized = normalize_ingredient(item.as_ref());
            let chars = normalized.chars().count();

            if chars == 0 {
                violations.push(IngredientViolation::Empty { index });
                continue;
            }
            if chars > MAX_INGREDIENT_CHARS {
                violations.push(IngredientViolation::TooLong {
                    index,
                    max: MAX_INGREDIENT_CHARS,
                    actual: chars,
                });
                continue;
            }
            if catalog.is_denylisted(&normalized) {
                violations.push(IngredientViolation::NotFood {
                    value: normalized.clone(),
                });
            }
            if !seen.insert(normalized.clone()) {
                if reported.insert(normalized.clone()) {
                    violations.push(IngredientViolation::Duplicate { value: normalized });
                }
                continue;
            }
            items.push(normalized);
        }

        if violations.is_empty() {
            Ok(Self(items))
        } else {
            Err(IngredientListError { violations })
        }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}
