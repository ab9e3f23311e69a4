//! Title extraction from generated recipe text.

use once_cell::sync::Lazy;
use regex::Regex;

static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#{1,6}\s+(.+?)\s*#*$").expect("static regex"));
static NUMBERED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+[.)]\s+(.+)$").expect("static regex"));

/// Picks a title from recipe text.
///
/// Tried in order, first match wins:
/// 1. the first markdown heading above any numbered line,
/// 2. a numbered first line, without its number,
/// 3. the first non-empty line.
///
/// Section headings below the numbered list are never titles.
pub fn extract_title(text: &str) -> Option<String> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let heading = lines
        .iter()
        .take_while(|line| !NUMBERED.is_match(line))
        .find_map(|line| HEADING.captures(line).map(|c| c[1].to_string()));
    if let Some(title) = heading.and_then(|t| clean(&t)) {
        return Some(title);
    }

    let first = lines.first()?;
    if let Some(title) = NUMBERED.captures(first).and_then(|c| clean(&c[1])) {
        return Some(title);
    }

    clean(first)
}

fn clean(raw: &str) -> Option<String> {
    let title = raw
        .trim()
        .trim_matches(|c| c == '*' || c == '_')
        .trim()
        .trim_start_matches("Title:")
        .trim();
    (!title.is_empty()).then(|| title.to_string())
}
