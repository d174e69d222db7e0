//! Preferred-doctor matching.

use strsim::{jaro_winkler, normalized_levenshtein};

use crate::models::{Provider, NO_PREFERENCE};

/// Title stripped from typed doctor names.
const TITLE: &str = "Dr. ";

/// Maximum number of suggestions returned.
const MAX_SUGGESTIONS: usize = 3;

/// Minimum similarity for a provider to be suggested.
const MIN_SIMILARITY: f64 = 0.70;

/// Typed name with a leading "Dr. " and surrounding whitespace removed.
pub fn bare_name(free_text: &str) -> &str {
    let trimmed = free_text.trim();
    trimmed.strip_prefix(TITLE).unwrap_or(trimmed).trim()
}

/// Whether the answer is the explicit "no preference" choice.
pub fn is_no_preference(free_text: &str) -> bool {
    free_text.trim().trim_end_matches('.') == NO_PREFERENCE
}

/// Resolve a typed doctor name to a provider.
///
/// "I have no preference" and blank input resolve to `None` without matching.
pub fn resolve<'p>(free_text: &str, providers: &'p [Provider]) -> Option<&'p Provider> {
    if is_no_preference(free_text) {
        return None;
    }
    let bare = bare_name(free_text);
    if bare.is_empty() {
        return None;
    }

    if let Some(exact) = providers
        .iter()
        .find(|p| p.name == bare || format!("{TITLE}{}", p.name) == free_text)
    {
        return Some(exact);
    }

    let bare_lower = bare.to_lowercase();
    providers.iter().find(|p| {
        let name_lower = p.name.to_lowercase();
        name_lower.contains(&bare_lower) || bare_lower.contains(&name_lower)
    })
}

/// Providers whose names look like the typed text, best first.
pub fn suggest<'p>(free_text: &str, providers: &'p [Provider]) -> Vec<&'p Provider> {
    if is_no_preference(free_text) {
        return Vec::new();
    }
    let bare = bare_name(free_text).to_lowercase();
    if bare.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(f64, &Provider)> = providers
        .iter()
        .map(|p| (similarity(&bare, &p.name.to_lowercase()), p))
        .filter(|(score, _)| *score >= MIN_SIMILARITY)
        .collect();

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, p)| p)
        .collect()
}

/// Combined similarity: Jaro-Winkler for typos, Levenshtein for overall shape.
fn similarity(a: &str, b: &str) -> f64 {
    jaro_winkler(a, b) * 0.6 + normalized_levenshtein(a, b) * 0.4
}

#[cfg(test)]
mod tests {
    use super::*;

    fn providers() -> Vec<Provider> {
        vec![
            Provider::new("1", "Jane Smith"),
            Provider::new("2", "Smith"),
            Provider::new("3", "Robert Alvarez"),
        ]
    }

    #[test]
    fn test_exact_with_title() {
        let providers = providers();
        let found = resolve("Dr. Jane Smith", &providers).unwrap();
        assert_eq!(found.id, "1");
    }

    #[test]
    fn test_exact_without_title() {
        let providers = providers();
        assert_eq!(resolve("  Smith ", &providers).unwrap().id, "2");
    }

    #[test]
    fn test_no_preference_short_circuits() {
        let providers = vec![Provider::new("x", "I have no preference")];
        assert!(resolve("I have no preference", &providers).is_none());
        assert!(resolve("I have no preference.", &providers).is_none());
    }

    #[test]
    fn test_substring_either_direction() {
        let providers = providers();
        // Typed text is contained in the provider name
        assert_eq!(resolve("alvarez", &providers).unwrap().id, "3");
        // Provider name is contained in the typed text
        assert_eq!(resolve("Dr. Robert Alvarez DVM", &providers).unwrap().id, "3");
    }

    #[test]
    fn test_substring_returns_first_match() {
        let providers = providers();
        assert_eq!(resolve("jane", &providers).unwrap().id, "1");
        // "smith" is lowercase so exact match fails; first containing provider wins
        assert_eq!(resolve("smith", &providers).unwrap().id, "1");
    }

    #[test]
    fn test_blank_and_unknown() {
        let providers = providers();
        assert!(resolve("   ", &providers).is_none());
        assert!(resolve("Dr. ", &providers).is_none());
        assert!(resolve("Dr. Nobody", &providers).is_none());
    }

    #[test]
    fn test_suggest_typo() {
        let providers = providers();
        let suggestions = suggest("Dr. Robert Alverez", &providers);
        assert_eq!(suggestions.first().map(|p| p.id.as_str()), Some("3"));
        assert!(suggest("I have no preference", &providers).is_empty());
    }
}
