//! "Did you mean" suggestions via nucleo-matcher
//!
//! Only consulted when a query ranks nothing. Matches the normalized query
//! against normalized catalogue names and returns display names.

use crate::catalogue::Catalogue;
use nucleo_matcher::{Config, Matcher, Utf32String};

/// Up to `limit` display names that fuzzily match `normalized_query`,
/// best first. Equal scores keep catalogue order.
pub fn suggest(normalized_query: &str, catalogue: &Catalogue, limit: usize) -> Vec<String> {
    if normalized_query.is_empty() || limit == 0 {
        return Vec::new();
    }

    let mut matcher = Matcher::new(Config::DEFAULT);
    let needle = Utf32String::from(normalized_query);

    let mut scored: Vec<(u16, &str)> = catalogue
        .items()
        .iter()
        .filter_map(|item| {
            let haystack = Utf32String::from(item.search_name());
            matcher
                .fuzzy_match(haystack.slice(..), needle.slice(..))
                .map(|score| (score, item.name.as_str()))
        })
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    let mut names: Vec<String> = Vec::new();
    for (_, name) in scored {
        if names.len() >= limit {
            break;
        }
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::{EntityKind, SearchableItem};

    fn catalogue() -> Catalogue {
        Catalogue::from_items([
            SearchableItem::new(EntityKind::Specialist, "cardiologia", "Cardiologia"),
            SearchableItem::new(EntityKind::Specialist, "dermatologia", "Dermatologia"),
            SearchableItem::new(EntityKind::Exam, "emocromo", "Emocromo completo"),
        ])
    }

    #[test]
    fn test_typo_suggests_closest_name() {
        let names = suggest("cardiolgia", &catalogue(), 5);
        assert_eq!(names.first().map(String::as_str), Some("Cardiologia"));
        assert!(!names.contains(&"Emocromo completo".to_string()));
    }

    #[test]
    fn test_limit_and_empty_query() {
        assert!(suggest("", &catalogue(), 5).is_empty());
        assert!(suggest("logia", &catalogue(), 0).is_empty());
        assert_eq!(suggest("logia", &catalogue(), 1).len(), 1);
    }

    #[test]
    fn test_no_match() {
        assert!(suggest("zzzz", &catalogue(), 5).is_empty());
    }
}
