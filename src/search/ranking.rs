//! Ranking
//!
//! Two interchangeable rankers sit behind [`Ranker`]:
//!
//! - [`WeightedRanker`] scores every catalogue item as a business weight for
//!   its kind plus additive text-match boosts, summed over all expanded terms.
//! - [`IndexedRanker`] looks expanded terms up in the inverted index and
//!   orders the referenced entities by a fixed kind priority.
//!
//! Both sort stably by descending score, so ties keep catalogue (or index)
//! order.

use super::expander::ExpandedQuery;
use super::normalizer::query_words;
use crate::catalogue::{format_id, ClinicData, EntityKind, SearchableItem};
use crate::config::{IndexPriorities, KindWeights, MatchBoosts, RankingPolicy, SearchConfig};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// A bundle suggested alongside a result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Uplink {
    pub target_id: String,
    pub message: String,
}

/// Ranked search hit
#[derive(Debug, Clone, Serialize)]
pub struct ScoredResult {
    #[serde(flatten)]
    pub item: Arc<SearchableItem>,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uplink: Option<Uplink>,
    /// Expanded terms that produced this hit
    pub matched_terms: Vec<String>,
}

pub trait Ranker: Send + Sync {
    fn policy(&self) -> RankingPolicy;

    /// Score and order candidates for an expanded query
    fn rank(&self, query: &ExpandedQuery, data: &ClinicData) -> Vec<ScoredResult>;
}

/// Build the ranker a config asks for
pub fn ranker_for(config: &SearchConfig) -> Box<dyn Ranker> {
    match config.policy {
        RankingPolicy::Weighted => Box::new(WeightedRanker::new(
            config.weights.clone(),
            config.boosts.clone(),
        )),
        RankingPolicy::Indexed => Box::new(IndexedRanker::new(config.index_priorities.clone())),
    }
}

fn sort_by_score(results: &mut [ScoredResult]) {
    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}

/// Up-link message for an exam bundled in a pack
pub fn upsell_message(pack_name: &str) -> String {
    format!(
        "Questo esame è incluso nel pacchetto {} - Risparmia con il check-up completo!",
        pack_name
    )
}

#[derive(Debug, Clone, Default)]
pub struct WeightedRanker {
    weights: KindWeights,
    boosts: MatchBoosts,
}

impl WeightedRanker {
    pub fn new(weights: KindWeights, boosts: MatchBoosts) -> Self {
        Self { weights, boosts }
    }

    /// Text bonus of one item for one term. Zero means no match.
    pub fn text_bonus(&self, item: &SearchableItem, term: &str) -> f64 {
        if term.is_empty() {
            return 0.0;
        }
        let b = &self.boosts;
        let name = item.search_name();
        let mut bonus = 0.0;

        if name == term {
            bonus += b.name_exact;
        } else if name.starts_with(term) {
            bonus += b.name_prefix;
        } else if name.contains(term) {
            bonus += b.name_contains;
        }

        for keyword in &item.keywords {
            if keyword == term {
                bonus += b.keyword_exact;
            } else if keyword.starts_with(term) {
                bonus += b.keyword_prefix;
            } else if keyword.contains(term) {
                bonus += b.keyword_contains;
            }
        }

        for word in query_words(term) {
            if name.contains(word) {
                bonus += b.word_in_name;
            }
            for keyword in &item.keywords {
                if keyword.contains(word) {
                    bonus += b.word_in_keyword;
                }
            }
        }

        for tag in &item.tags {
            if term.contains(tag.as_str()) || tag.contains(term) {
                bonus += b.tag_overlap;
            }
        }

        bonus
    }

    fn uplink(&self, item: &SearchableItem, data: &ClinicData) -> Option<Uplink> {
        let pack_id = item.upsell()?;
        let pack_name = data
            .catalogue
            .get(EntityKind::Pack, pack_id)
            .map(|pack| pack.name.clone())
            .unwrap_or_else(|| format_id(pack_id));
        Some(Uplink {
            target_id: pack_id.to_string(),
            message: upsell_message(&pack_name),
        })
    }
}

impl Ranker for WeightedRanker {
    fn policy(&self) -> RankingPolicy {
        RankingPolicy::Weighted
    }

    fn rank(&self, query: &ExpandedQuery, data: &ClinicData) -> Vec<ScoredResult> {
        let mut results = Vec::new();

        for item in data.catalogue.items() {
            let mut bonus = 0.0;
            let mut matched_terms = Vec::new();
            for term in &query.terms {
                let term_bonus = self.text_bonus(item, term);
                if term_bonus > 0.0 {
                    bonus += term_bonus;
                    matched_terms.push(term.clone());
                }
            }
            if bonus <= 0.0 {
                continue;
            }

            let mut score = self.weights.for_kind(item.kind()) + bonus;
            if item.featured {
                score += self.boosts.featured;
            }

            results.push(ScoredResult {
                item: Arc::clone(item),
                score,
                uplink: self.uplink(item, data),
                matched_terms,
            });
        }

        sort_by_score(&mut results);
        debug!(
            "Weighted ranking of {:?}: {} candidates",
            query.normalized,
            results.len()
        );
        results
    }
}

#[derive(Debug, Clone, Default)]
pub struct IndexedRanker {
    priorities: IndexPriorities,
}

impl IndexedRanker {
    pub fn new(priorities: IndexPriorities) -> Self {
        Self { priorities }
    }

    /// Index kinds name the clinic's own collections; price-list records of
    /// the same entity live under the sibling kind.
    fn lookup(data: &ClinicData, kind: EntityKind, id: &str) -> Option<Arc<SearchableItem>> {
        let sibling = match kind {
            EntityKind::Test => Some(EntityKind::Exam),
            EntityKind::Physician => Some(EntityKind::Specialist),
            _ => None,
        };
        data.catalogue
            .get(kind, id)
            .or_else(|| sibling.and_then(|s| data.catalogue.get(s, id)))
            .cloned()
    }

    /// A term's up-link is shown on bundles and lab tests, never on
    /// clinicians or specialties
    fn carries_uplink(kind: EntityKind) -> bool {
        matches!(
            kind,
            EntityKind::Pathway | EntityKind::Pack | EntityKind::Test | EntityKind::Exam
        )
    }
}

impl Ranker for IndexedRanker {
    fn policy(&self) -> RankingPolicy {
        RankingPolicy::Indexed
    }

    fn rank(&self, query: &ExpandedQuery, data: &ClinicData) -> Vec<ScoredResult> {
        let mut seen: HashSet<(EntityKind, &str)> = HashSet::new();
        let mut results = Vec::new();

        for term in &query.terms {
            let Some(entry) = data.index.term(term) else {
                continue;
            };

            for (kind, ids) in entry.by_kind() {
                for id in ids {
                    if !seen.insert((kind, id.as_str())) {
                        continue;
                    }

                    let item = Self::lookup(data, kind, id).unwrap_or_else(|| {
                        debug!("Index references unknown {} '{}'", kind, id);
                        Arc::new(SearchableItem::placeholder(kind, id))
                    });

                    let uplink = if Self::carries_uplink(kind) {
                        entry.uplink.as_ref().map(|hint| Uplink {
                            target_id: hint.id.clone(),
                            message: hint.message.clone(),
                        })
                    } else {
                        None
                    };

                    results.push(ScoredResult {
                        item,
                        score: self.priorities.for_kind(kind),
                        uplink,
                        matched_terms: vec![term.clone()],
                    });
                }
            }
        }

        sort_by_score(&mut results);
        debug!(
            "Indexed ranking of {:?}: {} candidates",
            query.normalized,
            results.len()
        );
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::{
        Catalogue, EntityDetails, ExamDetails, SearchIndex, TermEntry, UplinkHint,
    };

    fn tsh() -> SearchableItem {
        SearchableItem::new(EntityKind::Exam, "tsh", "TSH")
            .with_name_keyword()
            .with_keywords(["tiroide", "ormoni"])
            .with_details(EntityDetails::Exam(ExamDetails {
                upsell: Some("check-up-tiroide-base".to_string()),
                ..Default::default()
            }))
    }

    fn data() -> ClinicData {
        ClinicData {
            catalogue: Catalogue::from_items([
                SearchableItem::new(EntityKind::Pack, "check-up-tiroide-base", "Check-Up Tiroide Base")
                    .with_name_keyword()
                    .with_tags(["tiroide"]),
                tsh(),
                SearchableItem::new(EntityKind::Specialist, "cardiologia", "Cardiologia")
                    .with_tags(["cuore"]),
            ]),
            ..Default::default()
        }
    }

    fn weighted() -> WeightedRanker {
        WeightedRanker::new(KindWeights::default(), MatchBoosts::default())
    }

    #[test]
    fn test_text_bonus_name_and_keywords() {
        let ranker = weighted();
        let item = tsh();
        // name exact 50 + keyword "tsh" exact 20 + word in name 5 + word in keyword 3
        assert_eq!(ranker.text_bonus(&item, "tsh"), 78.0);
        assert_eq!(ranker.text_bonus(&item, "xyz"), 0.0);
        assert_eq!(ranker.text_bonus(&item, ""), 0.0);
    }

    #[test]
    fn test_pack_outranks_exam_for_shared_keyword() {
        let results = weighted().rank(&ExpandedQuery::literal("tiroide"), &data());
        let ids: Vec<&str> = results.iter().map(|r| r.item.id.as_str()).collect();
        assert_eq!(ids, vec!["check-up-tiroide-base", "tsh"]);
        assert!(results[0].score > results[1].score);
    }

    #[test]
    fn test_exam_carries_upsell_uplink() {
        let results = weighted().rank(&ExpandedQuery::literal("tsh"), &data());
        let tsh = results.iter().find(|r| r.item.id == "tsh").unwrap();
        let uplink = tsh.uplink.as_ref().unwrap();
        assert_eq!(uplink.target_id, "check-up-tiroide-base");
        assert_eq!(
            uplink.message,
            "Questo esame è incluso nel pacchetto Check-Up Tiroide Base - Risparmia con il check-up completo!"
        );
    }

    #[test]
    fn test_upsell_to_missing_pack_uses_formatted_id() {
        let data = ClinicData {
            catalogue: Catalogue::from_items([tsh()]),
            ..Default::default()
        };
        let results = weighted().rank(&ExpandedQuery::literal("tsh"), &data);
        assert!(results[0]
            .uplink
            .as_ref()
            .unwrap()
            .message
            .contains("Check Up Tiroide Base"));
    }

    #[test]
    fn test_featured_only_boosts_matches() {
        let data = ClinicData {
            catalogue: Catalogue::from_items([
                SearchableItem::new(EntityKind::Pathway, "slim-care", "Slim Care").featured(),
            ]),
            ..Default::default()
        };
        let ranker = weighted();
        assert!(ranker.rank(&ExpandedQuery::literal("tiroide"), &data).is_empty());

        let hit = ranker.rank(&ExpandedQuery::literal("slim"), &data);
        // pathway 95 + name prefix 30 + word in name 5 + featured 20
        assert_eq!(hit[0].score, 150.0);
    }

    #[test]
    fn test_bonus_sums_over_expanded_terms() {
        let ranker = weighted();
        let one = ranker.rank(&ExpandedQuery::literal("cuore"), &data());
        let two = ranker.rank(
            &ExpandedQuery {
                normalized: "cuore".to_string(),
                terms: vec!["cuore".to_string(), "cardiologia".to_string()],
            },
            &data(),
        );
        assert!(two[0].score > one[0].score);
        assert_eq!(two[0].matched_terms, vec!["cuore", "cardiologia"]);
    }

    #[test]
    fn test_ties_keep_catalogue_order() {
        let data = ClinicData {
            catalogue: Catalogue::from_items([
                SearchableItem::new(EntityKind::Exam, "ft3", "Tiroide FT3"),
                SearchableItem::new(EntityKind::Exam, "ft4", "Tiroide FT4"),
            ]),
            ..Default::default()
        };
        let results = weighted().rank(&ExpandedQuery::literal("tiroide"), &data);
        assert_eq!(results[0].item.id, "ft3");
        assert_eq!(results[1].item.id, "ft4");
        assert_eq!(results[0].score, results[1].score);
    }

    fn indexed_data() -> ClinicData {
        let mut index = SearchIndex::default();
        index.terms.insert(
            "tiroide".to_string(),
            TermEntry {
                tests: vec!["tsh".to_string(), "ft4".to_string()],
                packs: vec!["check-up-tiroide-base".to_string()],
                physicians: vec!["dr-rossi".to_string()],
                uplink: Some(UplinkHint {
                    id: "check-up-tiroide-base".to_string(),
                    message: "Risparmia con il pacchetto".to_string(),
                }),
                ..Default::default()
            },
        );
        index.terms.insert(
            "ormoni".to_string(),
            TermEntry {
                tests: vec!["tsh".to_string()],
                pathways: vec!["slim-care".to_string()],
                ..Default::default()
            },
        );
        ClinicData {
            index,
            ..data()
        }
    }

    #[test]
    fn test_indexed_orders_by_kind_priority() {
        let ranker = IndexedRanker::default();
        let results = ranker.rank(&ExpandedQuery::literal("tiroide"), &indexed_data());
        let ids: Vec<&str> = results.iter().map(|r| r.item.id.as_str()).collect();
        assert_eq!(ids, vec!["check-up-tiroide-base", "tsh", "ft4", "dr-rossi"]);
        assert_eq!(results[1].score, 70.0);
    }

    #[test]
    fn test_indexed_uplink_skips_clinicians() {
        let ranker = IndexedRanker::default();
        let results = ranker.rank(&ExpandedQuery::literal("tiroide"), &indexed_data());
        for result in &results {
            let expected = result.item.id != "dr-rossi";
            assert_eq!(result.uplink.is_some(), expected, "{}", result.item.id);
        }
        let tsh = results.iter().find(|r| r.item.id == "tsh").unwrap();
        assert_eq!(tsh.uplink.as_ref().unwrap().target_id, "check-up-tiroide-base");
    }

    #[test]
    fn test_indexed_uplink_absent_for_specialty_only_term() {
        let mut data = indexed_data();
        data.index.terms.insert(
            "cuore".to_string(),
            TermEntry {
                physicians: vec!["dr-verdi".to_string()],
                specialties: vec!["cardiologia".to_string()],
                uplink: Some(UplinkHint {
                    id: "check-up-cardiologico-plus".to_string(),
                    message: "Scopri il check-up".to_string(),
                }),
                ..Default::default()
            },
        );
        let results = IndexedRanker::default().rank(&ExpandedQuery::literal("cuore"), &data);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.uplink.is_none()));
    }

    #[test]
    fn test_indexed_resolves_siblings_and_placeholders() {
        let ranker = IndexedRanker::new(IndexPriorities::default());
        let results = ranker.rank(&ExpandedQuery::literal("tiroide"), &indexed_data());

        let tsh = results.iter().find(|r| r.item.id == "tsh").unwrap();
        assert_eq!(tsh.item.name, "TSH");
        assert_eq!(tsh.item.kind(), EntityKind::Exam);

        let rossi = results.iter().find(|r| r.item.id == "dr-rossi").unwrap();
        assert_eq!(rossi.item.name, "Dr Rossi");
        assert_eq!(rossi.item.kind(), EntityKind::Physician);
    }

    #[test]
    fn test_indexed_dedups_across_terms() {
        let ranker = IndexedRanker::default();
        let query = ExpandedQuery {
            normalized: "tiroide".to_string(),
            terms: vec!["tiroide".to_string(), "ormoni".to_string()],
        };
        let results = ranker.rank(&query, &indexed_data());
        assert_eq!(results.iter().filter(|r| r.item.id == "tsh").count(), 1);
        assert_eq!(results[0].item.id, "slim-care");
        assert!(results[0].uplink.is_none());
    }

    #[test]
    fn test_indexed_unknown_term_is_empty() {
        let results = IndexedRanker::default().rank(&ExpandedQuery::literal("xyz"), &indexed_data());
        assert!(results.is_empty());
    }

    #[test]
    fn test_ranker_for_policy() {
        let mut config = SearchConfig::default();
        assert_eq!(ranker_for(&config).policy(), RankingPolicy::Weighted);
        config.policy = RankingPolicy::Indexed;
        assert_eq!(ranker_for(&config).policy(), RankingPolicy::Indexed);
    }
}
