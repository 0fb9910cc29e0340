//! Catalogue loading from a data directory
//!
//! Layout (every file optional):
//!
//! ```text
//! {data}/packs.json            or {data}/entities/packs.json
//! {data}/pathways.json ...     (one file per entity collection)
//! {data}/search/index.json
//! {data}/search/synonyms.json
//! {data}/symptoms.json
//! {data}/related-exams.json    (specialty slug -> recommended exams)
//! ```
//!
//! Collection files hold either a bare array or `{"<collection>": [...]}`.
//! A malformed entry is skipped with a warning; a malformed file is skipped
//! as a whole. Only a missing data directory is an error.

use super::index::SearchIndex;
use super::related::RelatedTable;
use super::seed;
use super::types::{
    BookingType, ClinicianDetails, EntityDetails, EntityKind, ExamDetails, PackDetails,
    Preparation, ProcedureDetails, SearchableItem,
};
use super::{Catalogue, ClinicData};
use crate::error::SearchError;
use crate::search::SynonymTable;
use crate::triage::Symptom;
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What happened while loading, for `validate` and for logs
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped_entries: usize,
    pub duplicates: usize,
    pub skipped_files: Vec<String>,
    pub warnings: Vec<String>,
}

impl LoadReport {
    fn warn(&mut self, message: String) {
        warn!("{}", message);
        self.warnings.push(message);
    }

    pub fn is_clean(&self) -> bool {
        self.skipped_entries == 0 && self.duplicates == 0 && self.skipped_files.is_empty()
    }
}

/// Loader switches
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Append the built-in pathways, specialties and symptoms after the
    /// loaded ones (loaded entries win on duplicate ids)
    pub with_builtin: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { with_builtin: true }
    }
}

/// Raw record as found in the JSON files. Field names follow both the
/// Italian price-list schema (`nome`, `prezzo`, `sintomi`, ...) and the
/// English entity schema (`name`, `description_short`, ...).
///
/// Hand-edited files often carry `null` for empty lists and numeric ids;
/// both are accepted.
#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default, deserialize_with = "string_or_number")]
    id: Option<String>,
    #[serde(alias = "nome")]
    name: Option<String>,
    full_name: Option<String>,
    #[serde(alias = "descrizione", alias = "description_short")]
    description: Option<String>,
    #[serde(alias = "prezzo")]
    price: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    keywords: Vec<String>,
    #[serde(default, alias = "sintomi", deserialize_with = "null_as_default")]
    symptoms: Vec<String>,
    #[serde(default, alias = "esami_chiave", deserialize_with = "null_as_default")]
    key_exams: Vec<String>,
    #[serde(alias = "link")]
    url: Option<String>,
    #[serde(alias = "booking_type", alias = "bookingType")]
    booking: Option<BookingType>,
    #[serde(default, deserialize_with = "null_as_default")]
    featured: bool,
    #[serde(alias = "cat", alias = "category_id")]
    category: Option<String>,
    #[serde(alias = "specialty_id")]
    specialty: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    procedures: Vec<String>,
    #[serde(alias = "esami_count")]
    exams_count: Option<u32>,
    #[serde(alias = "risparmio", alias = "savings_percentage")]
    savings: Option<f64>,
    target: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    exams_included: Vec<String>,
    preparation: Option<Preparation>,
    prep: Option<String>,
    #[serde(alias = "referto", alias = "turnaround_time")]
    turnaround: Option<String>,
    #[serde(default, alias = "urgente", deserialize_with = "null_as_default")]
    urgent: bool,
    upsell: Option<String>,
    title: Option<String>,
    /// Page slug when it differs from the id
    slug: Option<String>,
}

/// `null` reads as the field's default
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Ids are strings, but exported spreadsheets emit plain numbers
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(de::Error::custom(format!(
            "id must be a string or a number, found {}",
            other
        ))),
    }
}

impl RawEntry {
    /// Shape a raw record into an item of `kind`. Returns `None` when a
    /// required field (id, name) is missing or blank.
    fn into_item(self, kind: EntityKind) -> Option<SearchableItem> {
        let id = self.id.filter(|s| !s.trim().is_empty())?;
        let name = self
            .name
            .or_else(|| self.full_name.clone())
            .filter(|s| !s.trim().is_empty())?;

        let details = match kind {
            EntityKind::Pack => EntityDetails::Pack(PackDetails {
                exams_count: self.exams_count,
                savings: self.savings,
                target: self.target,
                exams_included: self.exams_included,
            }),
            EntityKind::Pathway => EntityDetails::Pathway,
            EntityKind::Specialist | EntityKind::Physician => {
                let clinician = ClinicianDetails {
                    specialty: self.specialty.clone(),
                    procedures: self.procedures.clone(),
                    title: self.title.clone(),
                    full_name: self.full_name.clone(),
                };
                if kind == EntityKind::Specialist {
                    EntityDetails::Specialist(clinician)
                } else {
                    EntityDetails::Physician(clinician)
                }
            }
            EntityKind::Specialty => EntityDetails::Specialty,
            EntityKind::Procedure => EntityDetails::Procedure(ProcedureDetails {
                specialty: self.specialty.clone(),
            }),
            EntityKind::Exam | EntityKind::Test => {
                let exam = ExamDetails {
                    category: self.category.clone(),
                    preparation: self.preparation,
                    prep_note: self.prep,
                    turnaround: self.turnaround,
                    urgent: self.urgent,
                    upsell: self.upsell,
                };
                if kind == EntityKind::Exam {
                    EntityDetails::Exam(exam)
                } else {
                    EntityDetails::Test(exam)
                }
            }
        };

        // Symptoms double as tags for exams, the way patients search them
        let tags: Vec<String> = self.tags.into_iter().chain(self.symptoms).collect();

        let mut extra_keywords = self.keywords;
        extra_keywords.extend(self.key_exams);
        match kind {
            EntityKind::Exam | EntityKind::Test => extra_keywords.extend(self.category),
            EntityKind::Specialist => extra_keywords.push(id.clone()),
            EntityKind::Physician | EntityKind::Procedure => {
                extra_keywords.extend(self.specialty);
                extra_keywords.extend(self.procedures);
            }
            _ => {}
        }

        let mut item = SearchableItem::new(kind, id, name)
            .with_name_keyword()
            .with_tags(tags)
            .with_keywords(extra_keywords)
            .with_details(details);
        item.description = self.description;
        item.price = self.price;
        item.featured = self.featured;
        if let Some(url) = self.url {
            item.url = url;
        } else if let Some(slug) = self.slug.filter(|s| !s.trim().is_empty()) {
            item.url = kind.default_url(&slug);
        }
        if let Some(booking) = self.booking {
            item.booking = booking;
        }
        Some(item)
    }
}

/// Turn one collection document into items, skipping malformed entries
pub fn parse_collection(
    kind: EntityKind,
    document: &Value,
    report: &mut LoadReport,
) -> Vec<SearchableItem> {
    let entries = match document {
        Value::Array(entries) => entries,
        Value::Object(map) => match map.get(kind.collection()) {
            Some(Value::Array(entries)) => entries,
            _ => {
                report.warn(format!(
                    "{} document has no '{}' array",
                    kind,
                    kind.collection()
                ));
                return Vec::new();
            }
        },
        _ => {
            report.warn(format!("{} document is neither an array nor an object", kind));
            return Vec::new();
        }
    };

    let mut items = Vec::with_capacity(entries.len());
    for (position, entry) in entries.iter().enumerate() {
        let raw = match RawEntry::deserialize(entry) {
            Ok(raw) => raw,
            Err(e) => {
                report.skipped_entries += 1;
                report.warn(format!("Skipping {} entry #{}: {}", kind, position, e));
                continue;
            }
        };
        match raw.into_item(kind) {
            Some(item) => items.push(item),
            None => {
                report.skipped_entries += 1;
                report.warn(format!(
                    "Skipping {} entry #{}: missing id or name",
                    kind, position
                ));
            }
        }
    }
    items
}

/// Read a JSON file. `Ok(None)` when the file does not exist; a file that
/// cannot be read or parsed is recorded in the report and also yields `None`.
fn read_json<T: DeserializeOwned>(path: &Path, report: &mut LoadReport) -> Option<T> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            report.skipped_files.push(path.display().to_string());
            report.warn(format!("Failed to read {}: {}", path.display(), e));
            return None;
        }
    };
    match serde_json::from_str(&data) {
        Ok(value) => {
            debug!("Read {}", path.display());
            Some(value)
        }
        Err(e) => {
            report.skipped_files.push(path.display().to_string());
            report.warn(format!("Failed to parse {}: {}", path.display(), e));
            None
        }
    }
}

fn collection_path(dir: &Path, kind: EntityKind) -> PathBuf {
    let file = format!("{}.json", kind.collection());
    let direct = dir.join(&file);
    if direct.exists() {
        direct
    } else {
        dir.join("entities").join(file)
    }
}

/// Symptoms file: bare array, or `{"symptoms": [...]}`
#[derive(Deserialize)]
#[serde(untagged)]
enum SymptomsDocument {
    List(Vec<Symptom>),
    Wrapped { symptoms: Vec<Symptom> },
}

/// Load every document under `dir`
pub fn load_dir(dir: &Path, options: &LoadOptions) -> Result<ClinicData, SearchError> {
    if !dir.is_dir() {
        return Err(SearchError::CatalogueUnavailable(format!(
            "data directory {} does not exist",
            dir.display()
        )));
    }

    let mut report = LoadReport::default();
    let builtin = if options.with_builtin {
        Some(seed::builtin())
    } else {
        None
    };

    let mut builder = Catalogue::builder();
    for kind in EntityKind::ALL {
        let path = collection_path(dir, kind);
        if let Some(document) = read_json::<Value>(&path, &mut report) {
            for item in parse_collection(kind, &document, &mut report) {
                if builder.push(item) {
                    report.loaded += 1;
                } else {
                    report.duplicates += 1;
                }
            }
        }
        if let Some(seed) = &builtin {
            for item in seed.catalogue.items().iter().filter(|i| i.kind() == kind) {
                if !builder.contains(kind, &item.id) {
                    builder.push(item.as_ref().clone());
                    report.loaded += 1;
                }
            }
        }
    }
    let catalogue = builder.build();

    let index = read_json::<SearchIndex>(&dir.join("search").join("index.json"), &mut report)
        .unwrap_or_default()
        .normalized();

    let mut synonyms = read_json::<SynonymTable>(
        &dir.join("search").join("synonyms.json"),
        &mut report,
    )
    .map(SynonymTable::normalized)
    .or_else(|| builtin.as_ref().map(|seed| seed.synonyms.clone()))
    .unwrap_or_default();
    synonyms.merge_aliases(&index.aliases);

    let mut symptoms = match read_json::<SymptomsDocument>(&dir.join("symptoms.json"), &mut report)
    {
        Some(SymptomsDocument::List(list)) | Some(SymptomsDocument::Wrapped { symptoms: list }) => {
            list
        }
        None => Vec::new(),
    };
    if let Some(seed) = &builtin {
        for symptom in &seed.symptoms {
            if !symptoms.iter().any(|s| s.key == symptom.key) {
                symptoms.push(symptom.clone());
            }
        }
    }

    let mut related = builtin
        .as_ref()
        .map(|seed| seed.related.clone())
        .unwrap_or_default();
    if let Some(table) = read_json::<RelatedTable>(&dir.join("related-exams.json"), &mut report) {
        related.merge(table.normalized());
    }

    info!(
        "Loaded {} catalogue entries, {} index terms, {} symptoms from {} ({} skipped)",
        catalogue.len(),
        index.terms.len(),
        symptoms.len(),
        dir.display(),
        report.skipped_entries
    );

    Ok(ClinicData {
        catalogue,
        index,
        synonyms,
        symptoms,
        related,
        report,
    })
}
