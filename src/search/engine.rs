//! Search engine
//!
//! Ties together normalization, the red-flag gate, query expansion, ranking,
//! grouping and fuzzy suggestions. The engine is immutable once built and
//! `search` takes `&self`, so one engine can serve concurrent callers.

use super::expander::ExpandedQuery;
use super::grouping::{group, ResultSection};
use super::normalizer::normalize;
use super::ranking::{ranker_for, Ranker, ScoredResult, Uplink};
use super::red_flags::RedFlagDetector;
use super::suggest::suggest;
use crate::catalogue::ClinicData;
use crate::config::{RankingPolicy, SearchConfig};
use crate::error::SearchError;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// What to tell a user whose query matched a red flag
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmergencyDirective {
    pub matched_flag: String,
    pub phone: String,
    pub whatsapp: String,
    pub message: String,
}

/// A completed search
#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub normalized: String,
    /// Expanded terms, the normalized query first
    pub terms: Vec<String>,
    /// Best hits overall, capped at the result limit
    pub ranked: Vec<ScoredResult>,
    /// Sections built from every hit, each capped at the section limit
    pub grouped: Vec<ResultSection>,
    /// First up-link among the ranked hits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uplink: Option<Uplink>,
    /// Hits before any cap
    pub total: usize,
    /// Fuzzy name suggestions, only when nothing matched
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// The catalogue is not loaded yet
    NotReady,
    /// Query empty or shorter than `min_length` normalized characters
    NoQuery { min_length: usize },
    /// Query matched a red flag; no catalogue results are returned
    Emergency(EmergencyDirective),
    Results(SearchResults),
}

impl SearchOutcome {
    pub fn results(&self) -> Option<&SearchResults> {
        match self {
            SearchOutcome::Results(results) => Some(results),
            _ => None,
        }
    }

    pub fn is_emergency(&self) -> bool {
        matches!(self, SearchOutcome::Emergency(_))
    }
}

pub struct SearchEngine {
    data: Option<Arc<ClinicData>>,
    config: SearchConfig,
    red_flags: RedFlagDetector,
    ranker: Box<dyn Ranker>,
}

impl SearchEngine {
    /// Engine over loaded data, ranking with the configured policy
    pub fn new(data: Arc<ClinicData>, config: SearchConfig) -> Result<Self, SearchError> {
        let mut engine = Self::not_ready(config)?;
        engine.data = Some(data);
        Ok(engine)
    }

    /// Engine with no catalogue: red flags still fire, searches report
    /// [`SearchOutcome::NotReady`]
    pub fn not_ready(config: SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let red_flags = RedFlagDetector::new(&config.red_flags)?;
        let ranker = ranker_for(&config);
        Ok(Self {
            data: None,
            config,
            red_flags,
            ranker,
        })
    }

    /// Replace the configured ranker
    pub fn with_ranker(mut self, ranker: Box<dyn Ranker>) -> Self {
        self.ranker = ranker;
        self
    }

    pub fn is_ready(&self) -> bool {
        self.data.is_some()
    }

    pub fn policy(&self) -> RankingPolicy {
        self.ranker.policy()
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn data(&self) -> Option<&Arc<ClinicData>> {
        self.data.as_ref()
    }

    /// Red-flag check on a raw query
    pub fn check_red_flag(&self, query: &str) -> Option<EmergencyDirective> {
        let normalized = normalize(query);
        self.red_flags
            .detect(&normalized)
            .map(|flag| self.directive(flag))
    }

    fn directive(&self, flag: &str) -> EmergencyDirective {
        let contact = &self.config.emergency;
        EmergencyDirective {
            matched_flag: flag.to_string(),
            phone: contact.phone.clone(),
            whatsapp: contact.whatsapp.clone(),
            message: contact.message.clone(),
        }
    }

    /// Full search: up to the configured result limit
    pub fn search(&self, query: &str) -> SearchOutcome {
        self.run(query, self.config.limits.max_results)
    }

    /// Search with a caller-chosen cap on `ranked`
    pub fn search_with_limit(&self, query: &str, limit: usize) -> SearchOutcome {
        self.run(query, limit)
    }

    /// Typeahead search: same pipeline, shorter result list
    pub fn autocomplete(&self, query: &str) -> SearchOutcome {
        self.run(query, self.config.limits.max_autocomplete)
    }

    fn run(&self, query: &str, limit: usize) -> SearchOutcome {
        let limits = &self.config.limits;
        let normalized = normalize(query);

        if normalized.chars().count() < limits.min_query_length {
            debug!("Query {:?} below minimum length", query);
            return SearchOutcome::NoQuery {
                min_length: limits.min_query_length,
            };
        }

        if let Some(flag) = self.red_flags.detect(&normalized) {
            info!("Red flag '{}' in query, routing to medical team", flag);
            return SearchOutcome::Emergency(self.directive(flag));
        }

        let Some(data) = self.data.as_deref() else {
            debug!("Search before catalogue is ready");
            return SearchOutcome::NotReady;
        };

        let expanded = ExpandedQuery::new(normalized, &data.synonyms);
        let mut ranked = self.ranker.rank(&expanded, data);

        let total = ranked.len();
        let grouped = group(&ranked, limits.max_per_section);
        let uplink = ranked.iter().find_map(|r| r.uplink.clone());
        let suggestions = if ranked.is_empty() {
            suggest(&expanded.normalized, &data.catalogue, limits.max_suggestions)
        } else {
            Vec::new()
        };
        ranked.truncate(limit);

        debug!(
            "Search {:?} -> {} hits via {:?} ({} terms)",
            expanded.normalized,
            total,
            self.ranker.policy(),
            expanded.terms.len()
        );

        SearchOutcome::Results(SearchResults {
            query: query.to_string(),
            normalized: expanded.normalized,
            terms: expanded.terms,
            ranked,
            grouped,
            uplink,
            total,
            suggestions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::{
        seed, Catalogue, EntityDetails, EntityKind, ExamDetails, SearchableItem,
    };
    use crate::search::grouping::Section;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    fn thyroid_data() -> ClinicData {
        let mut data = seed::builtin();
        let mut items: Vec<SearchableItem> = vec![
            SearchableItem::new(EntityKind::Pack, "check-up-tiroide-base", "Check-Up Tiroide Base")
                .with_name_keyword()
                .with_tags(["tiroide", "ormoni"]),
            SearchableItem::new(EntityKind::Exam, "tsh", "TSH")
                .with_name_keyword()
                .with_keywords(["tiroide"])
                .with_details(EntityDetails::Exam(ExamDetails {
                    upsell: Some("check-up-tiroide-base".to_string()),
                    ..Default::default()
                })),
            SearchableItem::new(EntityKind::Exam, "ft4", "FT4 Tiroxina libera")
                .with_name_keyword()
                .with_keywords(["tiroide"]),
        ];
        items.extend(data.catalogue.items().iter().map(|i| (**i).clone()));
        data.catalogue = Catalogue::from_items(items);
        data
    }

    fn engine() -> SearchEngine {
        SearchEngine::new(Arc::new(thyroid_data()), SearchConfig::default()).unwrap()
    }

    #[test]
    fn test_pack_ranks_above_exam() {
        let outcome = engine().search("tiroide");
        let results = outcome.results().unwrap();

        let pack = results
            .ranked
            .iter()
            .position(|r| r.item.id == "check-up-tiroide-base")
            .unwrap();
        let tsh = results.ranked.iter().position(|r| r.item.id == "tsh").unwrap();
        assert!(pack < tsh);

        let sections: Vec<Section> = results.grouped.iter().map(|g| g.section).collect();
        let packs = sections.iter().position(|s| *s == Section::Packs).unwrap();
        let exams = sections.iter().position(|s| *s == Section::Exams).unwrap();
        assert!(packs < exams);
        assert_eq!(results.uplink.as_ref().unwrap().target_id, "check-up-tiroide-base");
    }

    #[test]
    fn test_minimum_query_length() {
        let engine = engine();
        assert!(matches!(engine.search("c"), SearchOutcome::NoQuery { min_length: 2 }));
        assert!(matches!(engine.search("   "), SearchOutcome::NoQuery { .. }));
        assert!(matches!(engine.search("!?"), SearchOutcome::NoQuery { .. }));

        let outcome = engine.search("ca");
        let results = outcome.results().unwrap();
        assert!(!results.is_empty());
        assert!(results.ranked.iter().any(|r| r.item.id == "cardiologia"));
    }

    #[test]
    fn test_no_query_reports_configured_minimum() {
        let mut config = SearchConfig::default();
        config.limits.min_query_length = 4;
        let engine = SearchEngine::new(Arc::new(thyroid_data()), config).unwrap();
        assert!(matches!(engine.search("tsh"), SearchOutcome::NoQuery { min_length: 4 }));
        assert!(engine.search("tiroide").results().is_some());
    }

    /// Ranker that records how often it is asked to rank
    struct CountingRanker {
        calls: Arc<AtomicUsize>,
    }

    impl Ranker for CountingRanker {
        fn policy(&self) -> RankingPolicy {
            RankingPolicy::Weighted
        }

        fn rank(&self, _query: &ExpandedQuery, _data: &ClinicData) -> Vec<ScoredResult> {
            self.calls.fetch_add(1, AtomicOrdering::SeqCst);
            Vec::new()
        }
    }

    #[test]
    fn test_ranker_not_called_for_gated_queries() {
        let calls = Arc::new(AtomicUsize::new(0));
        let engine = engine().with_ranker(Box::new(CountingRanker {
            calls: Arc::clone(&calls),
        }));

        assert!(matches!(engine.search("c"), SearchOutcome::NoQuery { .. }));
        assert!(engine.search("dolore toracico forte").is_emergency());
        assert!(engine.autocomplete("emorragia").is_emergency());
        assert_eq!(calls.load(AtomicOrdering::SeqCst), 0);

        assert!(engine.search("tiroide").results().is_some());
        assert_eq!(calls.load(AtomicOrdering::SeqCst), 1);
    }

    #[test]
    fn test_red_flag_short_circuits() {
        let engine = engine();
        match engine.search("Dolore Toracico") {
            SearchOutcome::Emergency(directive) => {
                assert_eq!(directive.matched_flag, "dolore toracico");
                assert_eq!(directive.phone, "079 956 1332");
                assert_eq!(directive.whatsapp, "393791234567");
            }
            other => panic!("expected emergency, got {:?}", other),
        }
        assert!(engine.search("ho bisogno di una visita urgente").is_emergency());
        assert!(engine.check_red_flag("tiroide").is_none());
    }

    #[test]
    fn test_red_flag_checked_before_readiness() {
        let engine = SearchEngine::not_ready(SearchConfig::default()).unwrap();
        assert!(!engine.is_ready());
        assert!(engine.search("infarto").is_emergency());
        assert!(matches!(engine.search("tiroide"), SearchOutcome::NotReady));
    }

    #[test]
    fn test_practitioner_synonym_finds_specialty() {
        let outcome = engine().search("endocrinologo");
        let results = outcome.results().unwrap();
        assert!(results.terms.contains(&"endocrinologia".to_string()));
        assert_eq!(results.ranked[0].item.id, "endocrinologia");
        assert_eq!(results.ranked[0].item.name, "Endocrinologia");
    }

    #[test]
    fn test_result_caps() {
        let mut config = SearchConfig::default();
        config.limits.max_results = 2;
        config.limits.max_per_section = 1;
        let engine = SearchEngine::new(Arc::new(thyroid_data()), config).unwrap();

        let outcome = engine.search("tiroide");
        let results = outcome.results().unwrap();
        assert_eq!(results.ranked.len(), 2);
        assert!(results.total > 2);
        assert!(results.grouped.iter().all(|g| g.results.len() <= 1));
        let exams = results
            .grouped
            .iter()
            .find(|g| g.section == Section::Exams)
            .unwrap();
        assert_eq!(exams.total, 2);
    }

    #[test]
    fn test_autocomplete_uses_shorter_cap() {
        let mut config = SearchConfig::default();
        config.limits.max_autocomplete = 1;
        let engine = SearchEngine::new(Arc::new(thyroid_data()), config).unwrap();
        let outcome = engine.autocomplete("tiroide");
        assert_eq!(outcome.results().unwrap().ranked.len(), 1);
    }

    #[test]
    fn test_no_hits_offer_suggestions() {
        let outcome = engine().search("cardiolgia");
        let results = outcome.results().unwrap();
        assert!(results.is_empty());
        assert_eq!(results.suggestions.first().map(String::as_str), Some("Cardiologia"));
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let value = serde_json::to_value(engine().search("c")).unwrap();
        assert_eq!(value["status"], "no_query");
        assert_eq!(value["min_length"], 2);

        let value = serde_json::to_value(engine().search("tsh")).unwrap();
        assert_eq!(value["status"], "results");
        assert_eq!(value["ranked"][0]["id"], "tsh");
        assert_eq!(value["ranked"][0]["kind"], "exam");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = SearchConfig::default();
        config.limits.max_results = 0;
        assert!(SearchEngine::not_ready(config).is_err());
    }
}
