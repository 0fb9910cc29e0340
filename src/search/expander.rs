//! Query expansion through aliases, synonyms and common misspellings

use super::normalizer::normalize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A primary term and the alternatives that stand for it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SynonymEntry {
    pub primary: String,
    #[serde(default)]
    pub alternatives: Vec<String>,
}

/// The `search/synonyms.json` document
///
/// Tables are keyed in a `BTreeMap`, so alias replacement and synonym lookup
/// walk them in a fixed order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SynonymTable {
    #[serde(default)]
    pub synonyms: BTreeMap<String, SynonymEntry>,
    #[serde(default, alias = "commonMisspellings")]
    pub common_misspellings: BTreeMap<String, String>,
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

impl SynonymTable {
    /// Normalize every key and value; empty keys are dropped
    pub fn normalized(self) -> Self {
        let synonyms = self
            .synonyms
            .into_iter()
            .map(|(key, entry)| {
                let entry = SynonymEntry {
                    primary: normalize(&entry.primary),
                    alternatives: entry
                        .alternatives
                        .iter()
                        .map(|a| normalize(a))
                        .filter(|a| !a.is_empty())
                        .collect(),
                };
                (key, entry)
            })
            .filter(|(_, entry)| !entry.primary.is_empty())
            .collect();

        Self {
            synonyms,
            common_misspellings: normalize_pairs(self.common_misspellings),
            aliases: normalize_pairs(self.aliases),
        }
    }

    /// Add aliases that are not already present; existing ones win
    pub fn merge_aliases(&mut self, aliases: &BTreeMap<String, String>) {
        for (alias, target) in aliases {
            let alias = normalize(alias);
            if alias.is_empty() || self.aliases.contains_key(&alias) {
                continue;
            }
            self.aliases.insert(alias, normalize(target));
        }
    }

    /// Expand a normalized query into the terms to search for.
    ///
    /// The query itself always comes first. For each alias contained in the
    /// query, the first occurrence is replaced by its target. A query equal to
    /// one of a synonym's alternatives adds the primary term, and a known
    /// misspelling adds its correction. Duplicates are dropped.
    pub fn expand(&self, normalized: &str) -> Vec<String> {
        let mut terms = vec![normalized.to_string()];
        let mut add = |term: String| {
            if !term.is_empty() && !terms.contains(&term) {
                terms.push(term);
            }
        };

        for (alias, target) in &self.aliases {
            if normalized.contains(alias.as_str()) {
                add(normalized.replacen(alias.as_str(), target, 1));
            }
        }

        for entry in self.synonyms.values() {
            if entry.alternatives.iter().any(|alt| alt == normalized) {
                add(entry.primary.clone());
            }
        }

        if let Some(correction) = self.common_misspellings.get(normalized) {
            add(correction.clone());
        }

        terms
    }
}

fn normalize_pairs(pairs: BTreeMap<String, String>) -> BTreeMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (normalize(&k), normalize(&v)))
        .filter(|(k, v)| !k.is_empty() && !v.is_empty())
        .collect()
}

/// A normalized query and its expansion, original term first
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedQuery {
    pub normalized: String,
    pub terms: Vec<String>,
}

impl ExpandedQuery {
    pub fn new(normalized: impl Into<String>, table: &SynonymTable) -> Self {
        let normalized = normalized.into();
        let terms = table.expand(&normalized);
        Self { normalized, terms }
    }

    /// An expansion holding the query alone
    pub fn literal(normalized: impl Into<String>) -> Self {
        let normalized = normalized.into();
        Self {
            terms: vec![normalized.clone()],
            normalized,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> SynonymTable {
        let json = r#"{
            "synonyms": {
                "ginecologia": {"primary": "ginecologia", "alternatives": ["ginecologo", "Ginecologa"]}
            },
            "common_misspellings": {"tirode": "tiroide"},
            "aliases": {"Check Up": "checkup", "esami del sangue": "emocromo"}
        }"#;
        serde_json::from_str::<SynonymTable>(json).unwrap().normalized()
    }

    #[test]
    fn test_expand_synonym_alternative() {
        let terms = table().expand("ginecologa");
        assert_eq!(terms, vec!["ginecologa", "ginecologia"]);
    }

    #[test]
    fn test_expand_alias_replaces_first_occurrence() {
        let terms = table().expand("check up check up");
        assert_eq!(terms, vec!["check up check up", "checkup check up"]);
    }

    #[test]
    fn test_expand_misspelling() {
        assert_eq!(table().expand("tirode"), vec!["tirode", "tiroide"]);
    }

    #[test]
    fn test_expand_unknown_term_is_identity() {
        assert_eq!(table().expand("cardiologia"), vec!["cardiologia"]);
        assert_eq!(SynonymTable::default().expand("ginecologo"), vec!["ginecologo"]);
    }

    #[test]
    fn test_alternatives_match_whole_query_only() {
        assert_eq!(table().expand("ginecologo bravo"), vec!["ginecologo bravo"]);
    }

    #[test]
    fn test_camel_case_misspellings_key() {
        let table: SynonymTable =
            serde_json::from_str(r#"{"commonMisspellings": {"emocrmo": "emocromo"}}"#).unwrap();
        assert_eq!(table.expand("emocrmo"), vec!["emocrmo", "emocromo"]);
    }

    #[test]
    fn test_merge_aliases_keeps_existing() {
        let mut table = table();
        let mut extra = BTreeMap::new();
        extra.insert("check up".to_string(), "altro".to_string());
        extra.insert("TSH Reflex".to_string(), "tsh".to_string());
        table.merge_aliases(&extra);

        assert_eq!(table.aliases.get("check up").map(String::as_str), Some("checkup"));
        assert_eq!(table.aliases.get("tsh reflex").map(String::as_str), Some("tsh"));
    }

    #[test]
    fn test_expanded_query_keeps_original_first() {
        let expanded = ExpandedQuery::new("tirode", &table());
        assert_eq!(expanded.normalized, "tirode");
        assert_eq!(expanded.terms[0], "tirode");
        assert_eq!(ExpandedQuery::literal("tsh").terms, vec!["tsh"]);
    }
}
