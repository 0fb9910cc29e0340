//! Clinic catalogue search
//!
//! Loads a clinic catalogue (packs, pathways, specialists, procedures, lab
//! exams), answers free-text queries with ranked and grouped results, routes
//! clinically urgent queries to the medical team, walks symptom triage
//! questionnaires, links physician names in free text and recommends lab
//! exams per specialty.

pub mod catalogue;
pub mod config;
pub mod error;
pub mod format;
pub mod linker;
pub mod search;
pub mod triage;

pub use catalogue::{Catalogue, CatalogueCache, ClinicData, EntityKind, SearchableItem};
pub use config::{RankingPolicy, SearchConfig};
pub use error::SearchError;
pub use linker::{PhysicianLink, PhysicianLinker};
pub use search::{SearchEngine, SearchOutcome};
