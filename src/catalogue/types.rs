//! Entity types shared by the loader, the rankers and the formatter

use serde::{Deserialize, Serialize};
use std::fmt;

/// Entity type, the partition used for grouping and business weighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Pack,
    Pathway,
    Specialist,
    Physician,
    Specialty,
    Procedure,
    Exam,
    Test,
}

impl EntityKind {
    /// Load order of the catalogue. Ties in ranking keep this order.
    pub const ALL: [EntityKind; 8] = [
        EntityKind::Pack,
        EntityKind::Pathway,
        EntityKind::Specialist,
        EntityKind::Physician,
        EntityKind::Specialty,
        EntityKind::Procedure,
        EntityKind::Exam,
        EntityKind::Test,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Pack => "pack",
            EntityKind::Pathway => "pathway",
            EntityKind::Specialist => "specialist",
            EntityKind::Physician => "physician",
            EntityKind::Specialty => "specialty",
            EntityKind::Procedure => "procedure",
            EntityKind::Exam => "exam",
            EntityKind::Test => "test",
        }
    }

    /// Collection name, used both as file stem and as wrapper key
    /// (`tests.json` may hold `[...]` or `{"tests": [...]}`)
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Pack => "packs",
            EntityKind::Pathway => "pathways",
            EntityKind::Specialist => "specialists",
            EntityKind::Physician => "physicians",
            EntityKind::Specialty => "specialties",
            EntityKind::Procedure => "procedures",
            EntityKind::Exam => "exams",
            EntityKind::Test => "tests",
        }
    }

    /// Default landing URL when a record does not carry one
    pub fn default_url(&self, id: &str) -> String {
        match self {
            EntityKind::Pathway | EntityKind::Specialty => format!("/pages/{}.html", id),
            EntityKind::Pack | EntityKind::Procedure => format!("/prestazioni/{}", id),
            EntityKind::Exam | EntityKind::Test => format!("/laboratorio/{}", id),
            EntityKind::Physician => format!("/equipe/{}.html", id),
            EntityKind::Specialist => format!("/equipe/?specialty={}", id),
        }
    }

    /// Default booking channel when a record does not carry one
    pub fn default_booking(&self) -> BookingType {
        match self {
            EntityKind::Pack | EntityKind::Pathway => BookingType::Whatsapp,
            EntityKind::Exam | EntityKind::Test => BookingType::Direct,
            EntityKind::Specialist
            | EntityKind::Physician
            | EntityKind::Specialty
            | EntityKind::Procedure => BookingType::Miodottore,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an entity is booked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingType {
    Whatsapp,
    Miodottore,
    Direct,
    Shop,
}

/// Lab test preparation flags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preparation {
    #[serde(default)]
    pub is_fasting_required: bool,
    pub fasting_hours: Option<u32>,
    #[serde(default)]
    pub is_urine_sample: bool,
    #[serde(default)]
    pub is_morning_only: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PackDetails {
    pub exams_count: Option<u32>,
    pub savings: Option<f64>,
    pub target: Option<String>,
    pub exams_included: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClinicianDetails {
    pub specialty: Option<String>,
    pub procedures: Vec<String>,
    /// Honorific as printed on the site (`Dott.`, `Dott.ssa`, `Prof.`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcedureDetails {
    pub specialty: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExamDetails {
    pub category: Option<String>,
    pub preparation: Option<Preparation>,
    /// Free-text preparation note for records that carry no structured flags
    pub prep_note: Option<String>,
    pub turnaround: Option<String>,
    pub urgent: bool,
    /// Id of the pack that bundles this exam
    pub upsell: Option<String>,
}

/// Kind-specific payload. The variant is the entity kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EntityDetails {
    Pack(PackDetails),
    Pathway,
    Specialist(ClinicianDetails),
    Physician(ClinicianDetails),
    Specialty,
    Procedure(ProcedureDetails),
    Exam(ExamDetails),
    Test(ExamDetails),
}

impl EntityDetails {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityDetails::Pack(_) => EntityKind::Pack,
            EntityDetails::Pathway => EntityKind::Pathway,
            EntityDetails::Specialist(_) => EntityKind::Specialist,
            EntityDetails::Physician(_) => EntityKind::Physician,
            EntityDetails::Specialty => EntityKind::Specialty,
            EntityDetails::Procedure(_) => EntityKind::Procedure,
            EntityDetails::Exam(_) => EntityKind::Exam,
            EntityDetails::Test(_) => EntityKind::Test,
        }
    }

    /// Empty payload for a kind
    pub fn empty(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Pack => EntityDetails::Pack(PackDetails::default()),
            EntityKind::Pathway => EntityDetails::Pathway,
            EntityKind::Specialist => EntityDetails::Specialist(ClinicianDetails::default()),
            EntityKind::Physician => EntityDetails::Physician(ClinicianDetails::default()),
            EntityKind::Specialty => EntityDetails::Specialty,
            EntityKind::Procedure => EntityDetails::Procedure(ProcedureDetails::default()),
            EntityKind::Exam => EntityDetails::Exam(ExamDetails::default()),
            EntityKind::Test => EntityDetails::Test(ExamDetails::default()),
        }
    }
}

/// A searchable catalogue entry
///
/// `keywords` and `tags` are stored normalized; duplicates are allowed and
/// order only matters for deterministic iteration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchableItem {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub tags: Vec<String>,
    pub keywords: Vec<String>,
    pub url: String,
    pub booking: BookingType,
    pub featured: bool,
    #[serde(flatten)]
    pub details: EntityDetails,
    #[serde(skip)]
    pub(crate) search_name: String,
}

impl SearchableItem {
    /// Build an item with an empty payload and no keywords
    pub fn new(kind: EntityKind, id: impl Into<String>, name: impl Into<String>) -> Self {
        let id = id.into();
        let name = name.into();
        Self {
            url: kind.default_url(&id),
            booking: kind.default_booking(),
            search_name: crate::search::normalize(&name),
            id,
            name,
            description: None,
            price: None,
            tags: Vec::new(),
            keywords: Vec::new(),
            featured: false,
            details: EntityDetails::empty(kind),
        }
    }

    /// Stand-in for an id referenced by the search index but absent from the
    /// catalogue: name is derived from the id (`check-up-base` -> `Check Up Base`)
    pub fn placeholder(kind: EntityKind, id: &str) -> Self {
        Self::new(kind, id, format_id(id))
    }

    pub fn kind(&self) -> EntityKind {
        self.details.kind()
    }

    /// Normalized name used for matching
    pub fn search_name(&self) -> &str {
        &self.search_name
    }

    /// Pack id this entry up-sells to, for exams and tests
    pub fn upsell(&self) -> Option<&str> {
        match &self.details {
            EntityDetails::Exam(d) | EntityDetails::Test(d) => d.upsell.as_deref(),
            _ => None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_booking(mut self, booking: BookingType) -> Self {
        self.booking = booking;
        self
    }

    pub fn featured(mut self) -> Self {
        self.featured = true;
        self
    }

    /// Add tags; each one is also a keyword
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for tag in tags {
            let tag = crate::search::normalize(tag.as_ref());
            if !tag.is_empty() {
                self.keywords.push(tag.clone());
                self.tags.push(tag);
            }
        }
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.keywords.extend(
            keywords
                .into_iter()
                .map(|k| crate::search::normalize(k.as_ref()))
                .filter(|k| !k.is_empty()),
        );
        self
    }

    /// Put the normalized name first in the keyword list
    pub fn with_name_keyword(mut self) -> Self {
        if !self.search_name.is_empty() {
            self.keywords.insert(0, self.search_name.clone());
        }
        self
    }

    pub fn with_details(mut self, details: EntityDetails) -> Self {
        self.details = details;
        self
    }
}

/// Title-case a slug: `check-up-tiroide` -> `Check Up Tiroide`
pub fn format_id(id: &str) -> String {
    id.split(|c| c == '-' || c == '_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_id() {
        assert_eq!(format_id("check-up-base"), "Check Up Base");
        assert_eq!(format_id("tsh"), "Tsh");
        assert_eq!(format_id("mal_di_testa"), "Mal Di Testa");
        assert_eq!(format_id(""), "");
    }

    #[test]
    fn test_kind_defaults() {
        assert_eq!(EntityKind::Test.default_url("tsh"), "/laboratorio/tsh");
        assert_eq!(EntityKind::Physician.default_url("rossi"), "/equipe/rossi.html");
        assert_eq!(EntityKind::Pack.default_booking(), BookingType::Whatsapp);
        assert_eq!(EntityKind::Exam.default_booking(), BookingType::Direct);
        assert_eq!(EntityKind::Specialty.collection(), "specialties");
    }

    #[test]
    fn test_item_builder_normalizes() {
        let item = SearchableItem::new(EntityKind::Pack, "check-up-tiroide", "Check-Up Tiroide")
            .with_tags(["Tiroide", "  ", "Ormoni"])
            .with_name_keyword();

        assert_eq!(item.kind(), EntityKind::Pack);
        assert_eq!(item.search_name(), "checkup tiroide");
        assert_eq!(item.tags, vec!["tiroide", "ormoni"]);
        assert_eq!(item.keywords, vec!["checkup tiroide", "tiroide", "ormoni"]);
    }

    #[test]
    fn test_item_serializes_kind_tag() {
        let item = SearchableItem::new(EntityKind::Pathway, "slim-care", "Slim Care");
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["kind"], "pathway");
        assert_eq!(value["booking"], "whatsapp");
        assert!(value.get("search_name").is_none());
    }

    #[test]
    fn test_upsell_only_for_exams() {
        let exam = SearchableItem::new(EntityKind::Exam, "tsh", "TSH").with_details(
            EntityDetails::Exam(ExamDetails {
                upsell: Some("check-up-tiroide".to_string()),
                ..Default::default()
            }),
        );
        assert_eq!(exam.upsell(), Some("check-up-tiroide"));

        let pack = SearchableItem::new(EntityKind::Pack, "check-up-tiroide", "Check-Up Tiroide");
        assert_eq!(pack.upsell(), None);
    }
}
