//! Prefix suggestions over the ingredient vocabulary.

use serde::{Deserialize, Serialize};

use super::catalog::IngredientCatalog;

/// Queries shorter than this return no suggestions.
pub const MIN_QUERY_CHARS: usize = 2;
pub const DEFAULT_AUTOCOMPLETE_LIMIT: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutocompleteSuggestion {
    pub value: String,
    pub label: String,
    pub category: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum MatchRank {
    Prefix,
    WordPrefix,
    Substring,
}

impl IngredientCatalog {
    /// Ranked suggestions for a partially typed ingredient.
    ///
    /// Whole-entry prefix matches come first (shorter entries first), then
    /// entries where a later word starts with the query, then any substring
    /// match. Vocabulary order breaks remaining ties.
    pub fn autocomplete(&self, query: &str, limit: usize) -> Vec<AutocompleteSuggestion> {
        let query = query.trim().to_lowercase();
        if query.chars().count() < MIN_QUERY_CHARS || limit == 0 {
            return Vec::new();
        }

        let mut ranked: Vec<(MatchRank, usize, usize, &str)> = self
            .vocabulary()
            .iter()
            .enumerate()
            .filter_map(|(position, entry)| {
                rank(entry, &query).map(|r| (r, entry.chars().count(), position, entry.as_str()))
            })
            .collect();

        ranked.sort_by(|a, b| match (a.0, b.0) {
            (MatchRank::Prefix, MatchRank::Prefix) => (a.1, a.2).cmp(&(b.1, b.2)),
            _ => (a.0, a.2).cmp(&(b.0, b.2)),
        });

        ranked
            .into_iter()
            .take(limit)
            .map(|(_, _, _, entry)| AutocompleteSuggestion {
                value: entry.to_string(),
                label: title_case(entry),
                category: self.category_of(entry).to_string(),
            })
            .collect()
    }
}

fn rank(entry: &str, query: &str) -> Option<MatchRank> {
    if entry.starts_with(query) {
        Some(MatchRank::Prefix)
    } else if entry.split_whitespace().skip(1).any(|w| w.starts_with(query)) {
        Some(MatchRank::WordPrefix)
    } else if entry.contains(query) {
        Some(MatchRank::Substring)
    } else {
        None
    }
}

fn title_case(entry: &str) -> String {
    entry
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(suggestions: &[AutocompleteSuggestion]) -> Vec<&str> {
        suggestions.iter().map(|s| s.value.as_str()).collect()
    }

    #[test]
    fn short_query_returns_nothing() {
        let catalog = IngredientCatalog::builtin();
        assert!(catalog.autocomplete("t", DEFAULT_AUTOCOMPLETE_LIMIT).is_empty());
        assert!(catalog.autocomplete("  ", DEFAULT_AUTOCOMPLETE_LIMIT).is_empty());
    }

    #[test]
    fn ranks_prefix_then_word_prefix_then_substring() {
        let catalog = IngredientCatalog::new(
            vec![
                ("vegetable", vec!["red onion", "onion", "scallion"]),
                ("pantry", vec!["onion powder"]),
            ],
            Vec::<&str>::new(),
        );
        let suggestions = catalog.autocomplete("ON", 10);
        assert_eq!(values(&suggestions), vec!["onion", "onion powder", "red onion", "scallion"]);
    }

    #[test]
    fn respects_limit() {
        let suggestions = IngredientCatalog::builtin().autocomplete("ch", 3);
        assert_eq!(suggestions.len(), 3);
    }

    #[test]
    fn suggestion_carries_label_and_category() {
        let suggestions = IngredientCatalog::builtin().autocomplete("olive", 8);
        assert_eq!(
            suggestions.first(),
            Some(&AutocompleteSuggestion {
                value: "olive oil".into(),
                label: "Olive Oil".into(),
                category: "pantry".into(),
            })
        );
    }
}
