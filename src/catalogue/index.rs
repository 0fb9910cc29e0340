//! Inverted index document: normalized term -> entity ids per type

use super::types::EntityKind;
use crate::search::normalize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Suggested bundle attached to an index term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UplinkHint {
    pub id: String,
    pub message: String,
}

/// Ids referenced by one index term
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TermEntry {
    #[serde(default)]
    pub pathways: Vec<String>,
    #[serde(default)]
    pub packs: Vec<String>,
    #[serde(default)]
    pub procedures: Vec<String>,
    #[serde(default)]
    pub tests: Vec<String>,
    #[serde(default)]
    pub physicians: Vec<String>,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default)]
    pub uplink: Option<UplinkHint>,
    #[serde(default)]
    pub clinical_context: Option<String>,
}

impl TermEntry {
    /// Id lists in the order the indexed ranker walks them
    pub fn by_kind(&self) -> [(EntityKind, &[String]); 6] {
        [
            (EntityKind::Pathway, &self.pathways),
            (EntityKind::Pack, &self.packs),
            (EntityKind::Procedure, &self.procedures),
            (EntityKind::Test, &self.tests),
            (EntityKind::Physician, &self.physicians),
            (EntityKind::Specialty, &self.specialties),
        ]
    }

    fn merge(&mut self, other: TermEntry) {
        fn extend_unique(into: &mut Vec<String>, from: Vec<String>) {
            for id in from {
                if !into.contains(&id) {
                    into.push(id);
                }
            }
        }
        extend_unique(&mut self.pathways, other.pathways);
        extend_unique(&mut self.packs, other.packs);
        extend_unique(&mut self.procedures, other.procedures);
        extend_unique(&mut self.tests, other.tests);
        extend_unique(&mut self.physicians, other.physicians);
        extend_unique(&mut self.specialties, other.specialties);
        if self.uplink.is_none() {
            self.uplink = other.uplink;
        }
        if self.clinical_context.is_none() {
            self.clinical_context = other.clinical_context;
        }
    }
}

/// The `search/index.json` document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchIndex {
    #[serde(default)]
    pub terms: BTreeMap<String, TermEntry>,
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

impl SearchIndex {
    /// Re-key terms and aliases by their normalized form. Terms that collide
    /// after normalization are merged; the first uplink seen is kept.
    pub fn normalized(self) -> Self {
        let mut terms: BTreeMap<String, TermEntry> = BTreeMap::new();
        for (term, entry) in self.terms {
            let key = normalize(&term);
            if key.is_empty() {
                continue;
            }
            match terms.get_mut(&key) {
                Some(existing) => existing.merge(entry),
                None => {
                    terms.insert(key, entry);
                }
            }
        }

        let aliases = self
            .aliases
            .into_iter()
            .map(|(alias, target)| (normalize(&alias), normalize(&target)))
            .filter(|(alias, _)| !alias.is_empty())
            .collect();

        Self { terms, aliases }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn term(&self, term: &str) -> Option<&TermEntry> {
        self.terms.get(term)
    }
}
