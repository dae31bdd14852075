use std::collections::HashMap;

use crosslens_common::ResolvedSource;

/// Lookup from `(country, source)` to an outlet's editorial orientation.
///
/// Keys are case-insensitive: country upper-cased, source lower-cased. Built
/// once per analysis run and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct OrientationRegistry {
    entries: HashMap<(String, String), String>,
}

impl OrientationRegistry {
    /// Later entries overwrite earlier ones with the same key.
    pub fn build(resolved_sources: &[ResolvedSource]) -> Self {
        let entries = resolved_sources
            .iter()
            .map(|s| (key(&s.country, &s.source), s.orientation.clone()))
            .collect();
        Self { entries }
    }

    pub fn lookup(&self, country: &str, source: &str) -> Option<&str> {
        self.entries.get(&key(country, source)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn key(country: &str, source: &str) -> (String, String) {
    (country.to_uppercase(), source.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(country: &str, source: &str, orientation: &str) -> ResolvedSource {
        ResolvedSource {
            country: country.to_string(),
            source: source.to_string(),
            orientation: orientation.to_string(),
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let registry = OrientationRegistry::build(&[resolved("USA", "NYTimes", "center-left")]);
        assert_eq!(registry.lookup("usa", "nytimes"), Some("center-left"));
        assert_eq!(registry.lookup("Usa", "NYTIMES"), Some("center-left"));
        assert_eq!(registry.lookup("GBR", "NYTimes"), None);
    }

    #[test]
    fn last_duplicate_wins() {
        let registry = OrientationRegistry::build(&[
            resolved("ITA", "Corriere", "centrist"),
            resolved("ita", "corriere", "center-right"),
        ]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup("ITA", "Corriere"), Some("center-right"));
    }

    #[test]
    fn empty_input_builds_empty_registry() {
        let registry = OrientationRegistry::build(&[]);
        assert!(registry.is_empty());
        assert_eq!(registry.lookup("USA", "NYTimes"), None);
    }

    #[test]
    fn orientation_content_is_not_validated() {
        let registry = OrientationRegistry::build(&[resolved("RUS", "TASS", "")]);
        assert_eq!(registry.lookup("RUS", "tass"), Some(""));
    }
}
