//! Search configuration
//!
//! Loaded from `--config <path>` or `<config dir>/clinic-search/config.json`.
//! Every field is optional in the file; missing ones take the defaults below.

use crate::catalogue::EntityKind;
use crate::error::SearchError;
use crate::search::red_flags::DEFAULT_RED_FLAGS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Which ranker turns an expanded query into scored results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RankingPolicy {
    /// Business weight per kind plus text-match boosts over the whole catalogue
    #[default]
    Weighted,
    /// Exact term lookup in the inverted index, ordered by kind priority
    Indexed,
}

/// Base score per entity kind for the weighted ranker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KindWeights {
    pub pack: f64,
    pub pathway: f64,
    pub specialist: f64,
    pub physician: f64,
    pub specialty: f64,
    pub procedure: f64,
    pub exam: f64,
    pub test: f64,
}

impl Default for KindWeights {
    fn default() -> Self {
        Self {
            pack: 100.0,
            pathway: 95.0,
            specialist: 80.0,
            physician: 80.0,
            specialty: 75.0,
            procedure: 60.0,
            exam: 50.0,
            test: 50.0,
        }
    }
}

impl KindWeights {
    pub fn for_kind(&self, kind: EntityKind) -> f64 {
        match kind {
            EntityKind::Pack => self.pack,
            EntityKind::Pathway => self.pathway,
            EntityKind::Specialist => self.specialist,
            EntityKind::Physician => self.physician,
            EntityKind::Specialty => self.specialty,
            EntityKind::Procedure => self.procedure,
            EntityKind::Exam => self.exam,
            EntityKind::Test => self.test,
        }
    }

    fn fields(&self) -> [(&'static str, f64); 8] {
        [
            ("weights.pack", self.pack),
            ("weights.pathway", self.pathway),
            ("weights.specialist", self.specialist),
            ("weights.physician", self.physician),
            ("weights.specialty", self.specialty),
            ("weights.procedure", self.procedure),
            ("weights.exam", self.exam),
            ("weights.test", self.test),
        ]
    }
}

/// Fixed score per entity kind for the indexed ranker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexPriorities {
    pub pathway: f64,
    pub pack: f64,
    pub procedure: f64,
    pub test: f64,
    pub physician: f64,
    pub specialty: f64,
}

impl Default for IndexPriorities {
    fn default() -> Self {
        Self {
            pathway: 100.0,
            pack: 90.0,
            procedure: 80.0,
            test: 70.0,
            physician: 60.0,
            specialty: 50.0,
        }
    }
}

impl IndexPriorities {
    /// Exams share the test priority and specialists the physician one
    pub fn for_kind(&self, kind: EntityKind) -> f64 {
        match kind {
            EntityKind::Pathway => self.pathway,
            EntityKind::Pack => self.pack,
            EntityKind::Procedure => self.procedure,
            EntityKind::Test | EntityKind::Exam => self.test,
            EntityKind::Physician | EntityKind::Specialist => self.physician,
            EntityKind::Specialty => self.specialty,
        }
    }

    fn fields(&self) -> [(&'static str, f64); 6] {
        [
            ("index_priorities.pathway", self.pathway),
            ("index_priorities.pack", self.pack),
            ("index_priorities.procedure", self.procedure),
            ("index_priorities.test", self.test),
            ("index_priorities.physician", self.physician),
            ("index_priorities.specialty", self.specialty),
        ]
    }
}

/// Additive text-match boosts for the weighted ranker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchBoosts {
    pub name_exact: f64,
    pub name_prefix: f64,
    pub name_contains: f64,
    pub keyword_exact: f64,
    pub keyword_prefix: f64,
    pub keyword_contains: f64,
    /// Per query word found in the name
    pub word_in_name: f64,
    /// Per keyword containing a query word
    pub word_in_keyword: f64,
    pub tag_overlap: f64,
    pub featured: f64,
}

impl Default for MatchBoosts {
    fn default() -> Self {
        Self {
            name_exact: 50.0,
            name_prefix: 30.0,
            name_contains: 10.0,
            keyword_exact: 20.0,
            keyword_prefix: 15.0,
            keyword_contains: 8.0,
            word_in_name: 5.0,
            word_in_keyword: 3.0,
            tag_overlap: 25.0,
            featured: 20.0,
        }
    }
}

impl MatchBoosts {
    fn fields(&self) -> [(&'static str, f64); 10] {
        [
            ("boosts.name_exact", self.name_exact),
            ("boosts.name_prefix", self.name_prefix),
            ("boosts.name_contains", self.name_contains),
            ("boosts.keyword_exact", self.keyword_exact),
            ("boosts.keyword_prefix", self.keyword_prefix),
            ("boosts.keyword_contains", self.keyword_contains),
            ("boosts.word_in_name", self.word_in_name),
            ("boosts.word_in_keyword", self.word_in_keyword),
            ("boosts.tag_overlap", self.tag_overlap),
            ("boosts.featured", self.featured),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_results: usize,
    pub max_per_section: usize,
    pub min_query_length: usize,
    pub max_autocomplete: usize,
    pub max_suggestions: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_results: 15,
            max_per_section: 5,
            min_query_length: 2,
            max_autocomplete: 8,
            max_suggestions: 5,
        }
    }
}

/// Where red-flag queries are sent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmergencyContact {
    pub phone: String,
    pub whatsapp: String,
    pub message: String,
}

impl Default for EmergencyContact {
    fn default() -> Self {
        Self {
            phone: "079 956 1332".to_string(),
            whatsapp: "393791234567".to_string(),
            message: "Per queste necessità cliniche, ti consigliamo di contattare direttamente il nostro team medico per una valutazione prioritaria.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub policy: RankingPolicy,
    pub weights: KindWeights,
    pub index_priorities: IndexPriorities,
    pub boosts: MatchBoosts,
    pub limits: Limits,
    pub red_flags: Vec<String>,
    pub emergency: EmergencyContact,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            policy: RankingPolicy::default(),
            weights: KindWeights::default(),
            index_priorities: IndexPriorities::default(),
            boosts: MatchBoosts::default(),
            limits: Limits::default(),
            red_flags: DEFAULT_RED_FLAGS.iter().map(|s| s.to_string()).collect(),
            emergency: EmergencyContact::default(),
        }
    }
}

impl SearchConfig {
    /// Reject settings the engine cannot honour
    pub fn validate(&self) -> Result<(), SearchError> {
        let limits = &self.limits;
        if limits.min_query_length == 0 {
            return Err(SearchError::InvalidConfig(
                "limits.min_query_length must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("limits.max_results", limits.max_results),
            ("limits.max_per_section", limits.max_per_section),
            ("limits.max_autocomplete", limits.max_autocomplete),
        ] {
            if value == 0 {
                return Err(SearchError::InvalidConfig(format!("{} must be positive", name)));
            }
        }
        // Scores are sums of these; a negative one would push matches below
        // unrelated items
        let scores = self
            .weights
            .fields()
            .into_iter()
            .chain(self.index_priorities.fields())
            .chain(self.boosts.fields());
        for (name, value) in scores {
            if !value.is_finite() || value < 0.0 {
                return Err(SearchError::InvalidConfig(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if self.emergency.phone.trim().is_empty() {
            return Err(SearchError::InvalidConfig(
                "emergency.phone must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Default config file location
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("clinic-search").join("config.json"))
}

/// Load configuration.
///
/// An explicit path must exist. Without one, the default location is tried
/// and a missing file yields the defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<SearchConfig, SearchError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match config_path() {
            Some(path) if path.exists() => path,
            _ => {
                debug!("No config file, using defaults");
                return Ok(SearchConfig::default());
            }
        },
    };

    debug!("Loading config from {}", path.display());
    let data = fs::read_to_string(&path)?;
    let config: SearchConfig = serde_json::from_str(&data)?;
    config.validate()?;
    Ok(config)
}
