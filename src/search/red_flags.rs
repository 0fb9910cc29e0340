//! Red-flag detection: clinical phrases that bypass search entirely

use super::normalizer::normalize;
use crate::error::SearchError;
use aho_corasick::{AhoCorasick, MatchKind};

/// Phrases that route a query to the medical team instead of the catalogue
pub const DEFAULT_RED_FLAGS: &[&str] = &[
    "tumore",
    "cancro",
    "neoplasia",
    "metastasi",
    "hiv",
    "aids",
    "sieropositivo",
    "infarto",
    "ictus",
    "emergenza",
    "urgenza",
    "urgente",
    "emorragia",
    "sangue nelle feci",
    "sangue nelle urine",
    "dolore toracico",
    "difficoltà respiratorie",
    "overdose",
    "avvelenamento",
    "suicidio",
    "violenza",
    "abuso",
];

/// Substring matcher over a normalized red-flag list
#[derive(Debug, Clone)]
pub struct RedFlagDetector {
    automaton: AhoCorasick,
    flags: Vec<String>,
}

impl RedFlagDetector {
    pub fn new<I, S>(flags: I) -> Result<Self, SearchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for flag in flags {
            let flag = normalize(flag.as_ref());
            if !flag.is_empty() && !normalized.contains(&flag) {
                normalized.push(flag);
            }
        }

        let automaton = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(&normalized)
            .map_err(|e| SearchError::InvalidConfig(format!("red flag patterns: {}", e)))?;

        Ok(Self {
            automaton,
            flags: normalized,
        })
    }

    /// The first red flag contained in an already-normalized query
    pub fn detect(&self, normalized_query: &str) -> Option<&str> {
        self.automaton
            .find(normalized_query)
            .map(|m| self.flags[m.pattern().as_usize()].as_str())
    }

    pub fn is_red_flag(&self, normalized_query: &str) -> bool {
        self.detect(normalized_query).is_some()
    }

    pub fn flags(&self) -> &[String] {
        &self.flags
    }
}
