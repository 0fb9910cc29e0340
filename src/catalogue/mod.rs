//! Clinic catalogue: typed entities, the inverted index and synonym tables
//!
//! The catalogue is read-only once built. Loading goes through
//! [`loader::load_dir`] (blocking) or [`cache::CatalogueCache`] (async,
//! shared in-flight load).

pub mod cache;
pub mod index;
pub mod loader;
pub mod related;
pub mod seed;
pub mod types;

pub use cache::{CatalogueCache, CatalogueSource};
pub use index::{SearchIndex, TermEntry, UplinkHint};
pub use loader::{load_dir, LoadOptions, LoadReport};
pub use related::{ExamPriority, RelatedExam, RelatedExams, RelatedPack, RelatedTable};
pub use types::{
    format_id, BookingType, ClinicianDetails, EntityDetails, EntityKind, ExamDetails, PackDetails,
    Preparation, ProcedureDetails, SearchableItem,
};

use crate::search::SynonymTable;
use crate::triage::Symptom;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Ordered, read-only collection of searchable items
#[derive(Debug, Default, Clone)]
pub struct Catalogue {
    items: Vec<Arc<SearchableItem>>,
    by_key: HashMap<(EntityKind, String), usize>,
}

impl Catalogue {
    pub fn builder() -> CatalogueBuilder {
        CatalogueBuilder::default()
    }

    /// Build from items in order, skipping duplicate `(kind, id)` pairs
    pub fn from_items<I>(items: I) -> Self
    where
        I: IntoIterator<Item = SearchableItem>,
    {
        let mut builder = Self::builder();
        for item in items {
            builder.push(item);
        }
        builder.build()
    }

    pub fn items(&self) -> &[Arc<SearchableItem>] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, kind: EntityKind, id: &str) -> Option<&Arc<SearchableItem>> {
        self.by_key
            .get(&(kind, id.to_string()))
            .map(|&idx| &self.items[idx])
    }

    /// Count of items per kind, in load order
    pub fn counts(&self) -> Vec<(EntityKind, usize)> {
        EntityKind::ALL
            .iter()
            .map(|kind| (*kind, self.items.iter().filter(|i| i.kind() == *kind).count()))
            .collect()
    }
}

/// Accumulates items; the first entry for a `(kind, id)` wins
#[derive(Debug, Default)]
pub struct CatalogueBuilder {
    items: Vec<Arc<SearchableItem>>,
    by_key: HashMap<(EntityKind, String), usize>,
}

impl CatalogueBuilder {
    /// Returns false when the item was a duplicate and got dropped
    pub fn push(&mut self, item: SearchableItem) -> bool {
        let key = (item.kind(), item.id.clone());
        if self.by_key.contains_key(&key) {
            warn!("Skipping duplicate {} entry '{}'", key.0, key.1);
            return false;
        }
        self.by_key.insert(key, self.items.len());
        self.items.push(Arc::new(item));
        true
    }

    pub fn contains(&self, kind: EntityKind, id: &str) -> bool {
        self.by_key.contains_key(&(kind, id.to_string()))
    }

    pub fn build(self) -> Catalogue {
        Catalogue {
            items: self.items,
            by_key: self.by_key,
        }
    }
}

/// Everything a search engine and the triage flow need, loaded together
#[derive(Debug, Default, Clone)]
pub struct ClinicData {
    pub catalogue: Catalogue,
    pub index: SearchIndex,
    pub synonyms: SynonymTable,
    pub symptoms: Vec<Symptom>,
    /// Lab exams to suggest next to each specialty
    pub related: RelatedTable,
    pub report: LoadReport,
}

impl ClinicData {
    pub fn symptom(&self, key: &str) -> Option<&Symptom> {
        self.symptoms.iter().find(|s| s.key == key)
    }

    /// Recommended exams for a specialty slug, page path or name
    pub fn related_exams(&self, specialty: &str) -> Option<&RelatedExams> {
        self.related.get(specialty)
    }

    /// Recommended packs that exist in the catalogue, in table order
    pub fn related_packs(&self, specialty: &str) -> Vec<&Arc<SearchableItem>> {
        self.related_exams(specialty)
            .map(|related| {
                related
                    .packs
                    .iter()
                    .filter_map(|pack| self.catalogue.get(EntityKind::Pack, &pack.id))
                    .collect()
            })
            .unwrap_or_default()
    }
}
