//! Physician name linking
//!
//! Finds mentions of the clinic's physicians in free text ("la Dott.ssa
//! Anna Bianchi", "Dottor Rossi Mario") and turns them into links to the
//! physician's page. Every physician contributes several spellings of their
//! name; all of them go into one Aho-Corasick automaton so a text is scanned
//! once regardless of team size.

use crate::catalogue::{Catalogue, EntityDetails, EntityKind, SearchableItem};
use crate::error::SearchError;
use aho_corasick::{AhoCorasick, MatchKind};
use serde::Serialize;
use std::collections::HashSet;
use std::ops::Range;
use tracing::debug;

/// One linked mention
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhysicianLink {
    /// Byte offsets into the scanned text
    pub start: usize,
    pub end: usize,
    pub physician_id: String,
    /// The mention as written
    pub text: String,
    pub url: String,
}

#[derive(Debug, Clone)]
struct Target {
    id: String,
    url: String,
}

/// Spellings a physician is recognised by, deduplicated, in priority order
pub fn name_variants(name: &str, full_name: Option<&str>, title: Option<&str>) -> Vec<String> {
    let name = name.trim();
    let title = title.map(str::trim).filter(|t| !t.is_empty());

    let mut variants = Vec::new();
    variants.extend(full_name.map(|n| n.trim().to_string()));
    variants.push(name.to_string());
    variants.push(format!("Dr. {}", name));
    if let Some(title) = title {
        variants.push(format!("{} {}", title, name));
    }
    variants.push(name.split_whitespace().rev().collect::<Vec<_>>().join(" "));

    match title {
        Some("Dott.") => variants.push(format!("Dottor {}", name)),
        Some("Dott.ssa") => {
            variants.push(format!("Dr.ssa {}", name));
            variants.push(format!("Dottoressa {}", name));
        }
        Some("Prof.") => {
            variants.push(format!("Professor {}", name));
            variants.push(format!("Professore {}", name));
        }
        _ => {}
    }

    let mut seen = HashSet::new();
    variants
        .into_iter()
        .filter(|v| !v.is_empty() && seen.insert(v.to_lowercase()))
        .collect()
}

/// Name matcher over every physician in a catalogue
#[derive(Debug, Clone)]
pub struct PhysicianLinker {
    automaton: AhoCorasick,
    /// Pattern index to target index
    owners: Vec<usize>,
    targets: Vec<Target>,
}

impl PhysicianLinker {
    /// Build from the catalogue's physician entries
    pub fn from_catalogue(catalogue: &Catalogue) -> Result<Self, SearchError> {
        Self::new(
            catalogue
                .items()
                .iter()
                .filter(|item| item.kind() == EntityKind::Physician)
                .map(|item| item.as_ref()),
        )
    }

    pub fn new<'a, I>(physicians: I) -> Result<Self, SearchError>
    where
        I: IntoIterator<Item = &'a SearchableItem>,
    {
        let mut patterns: Vec<String> = Vec::new();
        let mut owners = Vec::new();
        let mut targets = Vec::new();
        let mut claimed = HashSet::new();

        for item in physicians {
            let (full_name, title) = match &item.details {
                EntityDetails::Physician(d) | EntityDetails::Specialist(d) => {
                    (d.full_name.as_deref(), d.title.as_deref())
                }
                _ => (None, None),
            };

            let owner = targets.len();
            for variant in name_variants(&item.name, full_name, title) {
                // Two physicians sharing a spelling: the first keeps it
                if !claimed.insert(variant.to_lowercase()) {
                    debug!("Name variant {:?} already taken, skipping for {}", variant, item.id);
                    continue;
                }
                patterns.push(variant);
                owners.push(owner);
            }
            targets.push(Target {
                id: item.id.clone(),
                url: item.url.clone(),
            });
        }

        let automaton = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::LeftmostLongest)
            .build(&patterns)
            .map_err(|e| {
                SearchError::CatalogueUnavailable(format!("physician name patterns: {}", e))
            })?;

        debug!(
            "Physician linker: {} physicians, {} name variants",
            targets.len(),
            patterns.len()
        );
        Ok(Self {
            automaton,
            owners,
            targets,
        })
    }

    pub fn physician_count(&self) -> usize {
        self.targets.len()
    }

    /// Whole-word mentions in `text`, left to right, never overlapping.
    /// Where spellings overlap the longest one wins.
    pub fn find(&self, text: &str) -> Vec<PhysicianLink> {
        let existing = markdown_links(text);
        self.automaton
            .find_iter(text)
            .filter(|m| is_whole_word(text, m.start(), m.end()))
            .filter(|m| !existing.iter().any(|r| r.start < m.end() && m.start() < r.end))
            .map(|m| {
                let target = &self.targets[self.owners[m.pattern().as_usize()]];
                PhysicianLink {
                    start: m.start(),
                    end: m.end(),
                    physician_id: target.id.clone(),
                    text: text[m.start()..m.end()].to_string(),
                    url: target.url.clone(),
                }
            })
            .collect()
    }

    /// `text` with each mention wrapped as a markdown link
    pub fn link_markdown(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for link in self.find(text) {
            out.push_str(&text[last..link.start]);
            out.push('[');
            out.push_str(&link.text);
            out.push_str("](");
            out.push_str(&link.url);
            out.push(')');
            last = link.end;
        }
        out.push_str(&text[last..]);
        out
    }
}

fn is_whole_word(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

/// Byte ranges of `[label](target)` links already in the text
fn markdown_links(text: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut from = 0;
    while let Some(open) = text[from..].find('[').map(|i| from + i) {
        let Some(close) = text[open..].find("](").map(|i| open + i) else {
            break;
        };
        let Some(end) = text[close..].find(')').map(|i| close + i + 1) else {
            break;
        };
        ranges.push(open..end);
        from = end;
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::ClinicianDetails;

    fn physician(id: &str, name: &str, title: Option<&str>) -> SearchableItem {
        SearchableItem::new(EntityKind::Physician, id, name).with_details(EntityDetails::Physician(
            ClinicianDetails {
                title: title.map(str::to_string),
                full_name: title.map(|t| format!("{} {}", t, name)),
                ..Default::default()
            },
        ))
    }

    fn linker() -> PhysicianLinker {
        let team = [
            physician("francesco-dessole", "Francesco Dessole", Some("Dott.")),
            physician("anna-bianchi", "Anna Bianchi", Some("Dott.ssa")),
            physician("luigi-verdi", "Luigi Verdi", Some("Prof.")),
            physician("mario-rossi", "Mario Rossi", None),
        ];
        PhysicianLinker::new(team.iter()).unwrap()
    }

    #[test]
    fn test_variants_per_title() {
        assert_eq!(
            name_variants("Francesco Dessole", Some("Dott. Francesco Dessole"), Some("Dott.")),
            vec![
                "Dott. Francesco Dessole",
                "Francesco Dessole",
                "Dr. Francesco Dessole",
                "Dessole Francesco",
                "Dottor Francesco Dessole",
            ]
        );
        let dottoressa = name_variants("Anna Bianchi", None, Some("Dott.ssa"));
        assert!(dottoressa.contains(&"Dr.ssa Anna Bianchi".to_string()));
        assert!(dottoressa.contains(&"Dottoressa Anna Bianchi".to_string()));
        let prof = name_variants("Luigi Verdi", None, Some("Prof."));
        assert!(prof.contains(&"Professore Luigi Verdi".to_string()));
        assert_eq!(name_variants("Rossi", None, None), vec!["Rossi", "Dr. Rossi"]);
    }

    #[test]
    fn test_longest_spelling_wins() {
        let text = "Prenota con la Dottoressa Anna Bianchi oggi.";
        let links = linker().find(text);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].text, "Dottoressa Anna Bianchi");
        assert_eq!(links[0].physician_id, "anna-bianchi");
        assert_eq!(&text[links[0].start..links[0].end], "Dottoressa Anna Bianchi");
    }

    #[test]
    fn test_case_insensitive_and_reversed() {
        let links = linker().find("referto firmato da DESSOLE FRANCESCO e dal prof. luigi verdi");
        let ids: Vec<&str> = links.iter().map(|l| l.physician_id.as_str()).collect();
        assert_eq!(ids, vec!["francesco-dessole", "luigi-verdi"]);
        assert_eq!(links[1].text, "prof. luigi verdi");
    }

    #[test]
    fn test_requires_word_boundaries() {
        assert!(linker().find("XMario Rossiano").is_empty());
        assert_eq!(linker().find("(Mario Rossi)").len(), 1);
    }

    #[test]
    fn test_existing_links_left_alone() {
        let text = "Vedi [Mario Rossi](/equipe/mario-rossi.html) e Anna Bianchi";
        let links = linker().find(text);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].physician_id, "anna-bianchi");
    }

    #[test]
    fn test_link_markdown() {
        let linked = linker().link_markdown("Il Dr. Mario Rossi riceve il lunedì.");
        assert_eq!(
            linked,
            "Il [Dr. Mario Rossi](/equipe/mario-rossi.html) riceve il lunedì."
        );
        assert_eq!(linker().link_markdown("nessun medico"), "nessun medico");
    }

    #[test]
    fn test_shared_spelling_goes_to_first_physician() {
        let team = [
            physician("rossi-1", "Mario Rossi", None),
            physician("rossi-2", "Mario Rossi", Some("Dott.")),
        ];
        let linker = PhysicianLinker::new(team.iter()).unwrap();
        assert_eq!(linker.find("Mario Rossi")[0].physician_id, "rossi-1");
        assert_eq!(linker.find("Dottor Mario Rossi")[0].physician_id, "rossi-2");
    }

    #[test]
    fn test_from_catalogue_uses_physicians_only() {
        let catalogue = Catalogue::from_items([
            physician("mario-rossi", "Mario Rossi", None),
            SearchableItem::new(EntityKind::Specialist, "cardiologia", "Cardiologia"),
        ]);
        let linker = PhysicianLinker::from_catalogue(&catalogue).unwrap();
        assert_eq!(linker.physician_count(), 1);
        assert!(linker.find("visita di cardiologia").is_empty());
    }

    #[test]
    fn test_empty_team_links_nothing() {
        let linker = PhysicianLinker::new(std::iter::empty::<&SearchableItem>()).unwrap();
        assert!(linker.find("Dr. Mario Rossi").is_empty());
    }
}
