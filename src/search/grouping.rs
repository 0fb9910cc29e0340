//! Grouping of ranked results into display sections

use super::ranking::ScoredResult;
use crate::catalogue::EntityKind;
use serde::Serialize;

/// Display section, declared in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Pathways,
    Packs,
    Specialists,
    Procedures,
    Exams,
    Specialties,
}

impl Section {
    pub const ORDER: [Section; 6] = [
        Section::Pathways,
        Section::Packs,
        Section::Specialists,
        Section::Procedures,
        Section::Exams,
        Section::Specialties,
    ];

    pub fn of(kind: EntityKind) -> Section {
        match kind {
            EntityKind::Pathway => Section::Pathways,
            EntityKind::Pack => Section::Packs,
            EntityKind::Specialist | EntityKind::Physician => Section::Specialists,
            EntityKind::Procedure => Section::Procedures,
            EntityKind::Exam | EntityKind::Test => Section::Exams,
            EntityKind::Specialty => Section::Specialties,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Section::Pathways => "Percorsi Consigliati",
            Section::Packs => "Check-up e Pacchetti",
            Section::Specialists => "Medici Specialisti",
            Section::Procedures => "Prestazioni",
            Section::Exams => "Esami di Laboratorio",
            Section::Specialties => "Specialità",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultSection {
    pub section: Section,
    pub title: &'static str,
    /// At most the per-section cap, in rank order
    pub results: Vec<ScoredResult>,
    /// Hits in this section before the cap
    pub total: usize,
}

/// Split ranked results into sections in display order.
///
/// Empty sections are left out. Each section keeps rank order and is capped
/// at `per_section` entries.
pub fn group(results: &[ScoredResult], per_section: usize) -> Vec<ResultSection> {
    Section::ORDER
        .iter()
        .filter_map(|&section| {
            let mut members = results
                .iter()
                .filter(|r| Section::of(r.item.kind()) == section)
                .peekable();
            members.peek()?;

            let mut total = 0;
            let mut kept = Vec::new();
            for result in members {
                total += 1;
                if kept.len() < per_section {
                    kept.push(result.clone());
                }
            }

            Some(ResultSection {
                section,
                title: section.title(),
                results: kept,
                total,
            })
        })
        .collect()
}
