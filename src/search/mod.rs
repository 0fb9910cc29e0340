//! Catalogue search
//!
//! A query flows through [`normalizer`], the [`red_flags`] gate,
//! [`expander`], a [`ranking::Ranker`] and [`grouping`]. [`engine`] wires the
//! stages together; [`session`] keeps interactive callers from acting on
//! stale results.

pub mod engine;
pub mod expander;
pub mod grouping;
pub mod normalizer;
pub mod ranking;
pub mod red_flags;
pub mod session;
pub mod suggest;


pub use engine::{EmergencyDirective, SearchEngine, SearchOutcome, SearchResults};
pub use expander::{ExpandedQuery, SynonymEntry, SynonymTable};
pub use grouping::{group, ResultSection, Section};
pub use normalizer::{normalize, query_words};
pub use ranking::{ranker_for, IndexedRanker, Ranker, ScoredResult, Uplink, WeightedRanker};
pub use red_flags::RedFlagDetector;
pub use session::{QueryGate, Ticket};
pub use suggest::suggest;
