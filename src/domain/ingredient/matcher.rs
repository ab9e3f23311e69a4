//! Fuzzy ingredient matching.
//!
//! Similarity is the normalized edit distance `(max_len - distance) / max_len`
//! computed over Unicode scalar values. Every call compares the input with
//! every vocabulary entry, so cost is O(n * m * V); inputs longer than
//! [`MAX_INGREDIENT_CHARS`] are rejected before any scoring.

use serde::{Deserialize, Serialize};

use super::catalog::IngredientCatalog;
use super::list::MAX_INGREDIENT_CHARS;

/// A vocabulary entry must score strictly above this to become a suggestion.
pub const SUGGESTION_THRESHOLD: f64 = 0.6;

/// Confidence reported for plausible ingredients the catalog does not know.
pub const UNKNOWN_CONFIDENCE: f64 = 0.3;

/// Minimum similarity for an entry to be listed as an alternative.
const ALTERNATIVE_THRESHOLD: f64 = 0.5;

const MAX_ALTERNATIVES: usize = 3;

/// Outcome of checking one raw ingredient string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientValidationResult {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub alternatives: Vec<String>,
}

impl IngredientValidationResult {
    fn rejected() -> Self {
        Self {
            is_valid: false,
            suggestion: None,
            confidence: 0.0,
            category: None,
            alternatives: Vec::new(),
        }
    }
}

/// Classic Levenshtein distance with unit costs.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Two rolling rows of the DP table.
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Normalized similarity in `[0, 1]`; two empty strings are identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    (max_len - edit_distance(a, b)) as f64 / max_len as f64
}

impl IngredientCatalog {
    /// Checks one raw ingredient against the catalog.
    pub fn match_input(&self, input: &str) -> IngredientValidationResult {
        let normalized = input.trim().to_lowercase();
        if normalized.is_empty() || normalized.chars().nth(MAX_INGREDIENT_CHARS).is_some() {
            return IngredientValidationResult::rejected();
        }

        if self.is_known(&normalized) {
            return IngredientValidationResult {
                is_valid: true,
                suggestion: None,
                confidence: 1.0,
                category: Some(self.category_of(&normalized).to_string()),
                alternatives: Vec::new(),
            };
        }

        let ranked = self.rank_by_similarity(&normalized);

        if let Some((best, score)) = ranked.first().filter(|(_, s)| *s > SUGGESTION_THRESHOLD) {
            let alternatives = ranked
                .iter()
                .skip(1)
                .filter(|(_, s)| *s >= ALTERNATIVE_THRESHOLD)
                .take(MAX_ALTERNATIVES)
                .map(|(entry, _)| entry.to_string())
                .collect();
            return IngredientValidationResult {
                is_valid: false,
                suggestion: Some(best.to_string()),
                confidence: *score,
                category: Some(self.category_of(best).to_string()),
                alternatives,
            };
        }

        if self.is_denylisted(&normalized) {
            return IngredientValidationResult::rejected();
        }

        IngredientValidationResult {
            is_valid: true,
            suggestion: None,
            confidence: UNKNOWN_CONFIDENCE,
            category: None,
            alternatives: ranked
                .iter()
                .filter(|(_, s)| *s >= ALTERNATIVE_THRESHOLD)
                .take(MAX_ALTERNATIVES)
                .map(|(entry, _)| entry.to_string())
                .collect(),
        }
    }

    /// Vocabulary entries ordered by descending similarity.
    ///
    /// The sort is stable, so equal scores keep vocabulary order.
    fn rank_by_similarity<'a>(&'a self, normalized: &str) -> Vec<(&'a str, f64)> {
        let mut scored: Vec<(&str, f64)> = self
            .vocabulary()
            .iter()
            .map(|entry| (entry.as_str(), similarity(normalized, entry)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored
    }
}
