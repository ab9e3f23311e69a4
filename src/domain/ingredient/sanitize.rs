//! Input normalization for user-supplied ingredient names.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("static regex"));
static SCRIPT_SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(javascript|vbscript|data)\s*:").expect("static regex"));
static EVENT_HANDLER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bon[a-z]+\s*=").expect("static regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

/// Lowercases, trims, collapses whitespace and strips markup from an ingredient.
///
/// The result never contains `<` or `>`.
pub fn normalize_ingredient(raw: &str) -> String {
    let stripped = TAG.replace_all(raw, "");
    let stripped = SCRIPT_SCHEME.replace_all(&stripped, "");
    let stripped = EVENT_HANDLER.replace_all(&stripped, "");
    let stripped: String = stripped.chars().filter(|c| !matches!(c, '<' | '>')).collect();
    WHITESPACE
        .replace_all(stripped.trim(), " ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_lowercases() {
        assert_eq!(normalize_ingredient("  Olive   Oil "), "olive oil");
    }

    #[test]
    fn strips_tags_and_script_vectors() {
        assert_eq!(normalize_ingredient("<script>alert(1)</script>basil"), "alert(1)basil");
        assert_eq!(normalize_ingredient("javascript:tomato"), "tomato");
        assert_eq!(normalize_ingredient("onion onclick=x"), "onion x");
        assert_eq!(normalize_ingredient("a < b > c"), "a c");
        assert_eq!(normalize_ingredient("salt > pepper"), "salt pepper");
    }

    #[test]
    fn keeps_words_that_start_with_on() {
        assert_eq!(normalize_ingredient("Onion"), "onion");
    }
}
