//! Text normalization
//!
//! Every string that takes part in matching (queries, names, keywords, tags,
//! index terms, synonym tables, red flags) goes through [`normalize`] first,
//! so comparisons are plain byte equality and substring checks.

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};
use unicode_segmentation::UnicodeSegmentation;

/// Words shorter than this are ignored by per-word boosts
pub const MIN_WORD_CHARS: usize = 2;

/// Lowercase, strip diacritics, keep only `[a-z0-9]` and whitespace, trim.
///
/// Inner whitespace is not collapsed: "PMA / Fertilità" becomes
/// "pma  fertilita".
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();
    folded.trim().to_string()
}

/// Words of an already-normalized string worth boosting on
pub fn query_words(normalized: &str) -> impl Iterator<Item = &str> {
    normalized
        .unicode_words()
        .filter(|w| w.chars().count() >= MIN_WORD_CHARS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_accents_and_case() {
        assert_eq!(normalize("Fertilità"), "fertilita");
        assert_eq!(normalize("  ÉCOGRAFIA Addome "), "ecografia addome");
        assert_eq!(normalize("perché"), "perche");
    }

    #[test]
    fn test_normalize_drops_punctuation() {
        assert_eq!(normalize("Check-Up Tiroide"), "checkup tiroide");
        assert_eq!(normalize("PMA / Fertilità"), "pma  fertilita");
        assert_eq!(normalize("Vitamina D (25-OH)"), "vitamina d 25oh");
        assert_eq!(normalize("!!!"), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for s in ["Dolore Toracico", "difficoltà respiratorie", "ß and ø", "HbA1c"] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_query_words_skip_short() {
        let words: Vec<&str> = query_words("vitamina d 25oh").collect();
        assert_eq!(words, vec!["vitamina", "25oh"]);
        assert_eq!(query_words("").count(), 0);
    }
}
