//! Markdown rendering of search outcomes, triage results and load reports
//!
//! Scoring never depends on anything here.

use crate::catalogue::{format_id, ClinicData, ExamPriority, RelatedExams, SearchableItem};
use crate::search::{SearchOutcome, SearchResults};
use crate::triage::{by_category, category_label, Symptom, TriageResult, Urgency};
use std::fmt::Write;

pub fn format_price(price: f64) -> String {
    if price.fract() == 0.0 {
        format!("€{:.0}", price)
    } else {
        format!("€{:.2}", price)
    }
}

fn item_line(item: &SearchableItem) -> String {
    let mut line = format!("**{}**", item.name);
    if let Some(price) = item.price {
        let _ = write!(line, " · {}", format_price(price));
    }
    if let Some(description) = item.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = write!(line, " - {}", description);
    }
    let _ = write!(line, " ({})", item.url);
    line
}

pub fn format_outcome(outcome: &SearchOutcome) -> String {
    match outcome {
        SearchOutcome::NotReady => "Catalogue not loaded yet.".to_string(),
        SearchOutcome::NoQuery { min_length: 1 } => "Type something to search.".to_string(),
        SearchOutcome::NoQuery { min_length } => {
            format!("Type at least {} characters to search.", min_length)
        }
        SearchOutcome::Emergency(directive) => {
            let mut md = String::from("# ⚠️ Contatta il team medico\n\n");
            let _ = writeln!(md, "{}\n", directive.message);
            let _ = writeln!(md, "- Telefono: {}", directive.phone);
            let _ = writeln!(md, "- WhatsApp: https://wa.me/{}", directive.whatsapp);
            md
        }
        SearchOutcome::Results(results) => format_results(results),
    }
}

fn format_results(results: &SearchResults) -> String {
    let mut md = format!("# Risultati per \"{}\"\n\n", results.query);

    if results.is_empty() {
        md.push_str("Nessun risultato.\n");
        if !results.suggestions.is_empty() {
            let _ = writeln!(md, "\nForse cercavi: {}", results.suggestions.join(", "));
        }
        return md;
    }

    if let Some(uplink) = &results.uplink {
        let _ = writeln!(md, "> 💡 {}\n", uplink.message);
    }

    for section in &results.grouped {
        let _ = writeln!(md, "## {} ({})\n", section.title, section.total);
        for hit in &section.results {
            let _ = writeln!(md, "- {}", item_line(&hit.item));
        }
        md.push('\n');
    }

    let _ = writeln!(md, "{} risultati", results.total);
    md
}

pub fn format_triage(result: &TriageResult) -> String {
    let mut md = format!("# {}\n\n", result.symptom_label);

    if result.is_emergency {
        md.push_str("## 🚨 EMERGENZA\n\n");
    }
    let _ = writeln!(md, "**{}**: {}\n", result.urgency_label, result.advice);
    if result.urgency >= Urgency::High {
        if let Some(note) = &result.emergency_note {
            let _ = writeln!(md, "> {}\n", note);
        }
    }

    if !result.description.is_empty() {
        let _ = writeln!(md, "{}\n", result.description);
    }

    let suggestions = &result.suggestions;
    for (title, ids) in [
        ("Specialisti", &suggestions.specialists),
        ("Esami", &suggestions.exams),
        ("Pacchetti", &suggestions.packs),
        ("Percorsi", &suggestions.pathways),
    ] {
        if ids.is_empty() {
            continue;
        }
        let _ = writeln!(md, "## {}\n", title);
        for id in ids {
            let _ = writeln!(md, "- {}", format_id(id));
        }
        md.push('\n');
    }

    if !result.answers.is_empty() {
        md.push_str("## Risposte\n\n");
        for answer in &result.answers {
            let _ = writeln!(md, "- {} → {}", answer.question, answer.answer);
        }
        md.push('\n');
    }

    if !result.red_flags.is_empty() {
        let _ = writeln!(md, "Segnali d'allarme: {}", result.red_flags.join(", "));
    }
    md
}

pub fn format_symptoms(symptoms: &[Symptom]) -> String {
    let mut md = String::from("# Sintomi\n\n");
    for (category, list) in by_category(symptoms) {
        let _ = writeln!(md, "## {}\n", category_label(category));
        for symptom in list {
            let _ = writeln!(md, "- `{}` {}", symptom.key, symptom.label);
        }
        md.push('\n');
    }
    md
}

/// Recommended exams for a specialty, grouped by priority
pub fn format_related(specialty: &str, related: &RelatedExams) -> String {
    let mut md = format!("# {} · {}\n\n", related.title, format_id(specialty));
    if !related.description.is_empty() {
        let _ = writeln!(md, "{}\n", related.description);
    }

    for priority in ExamPriority::ALL {
        let mut exams = related.with_priority(priority).peekable();
        if exams.peek().is_none() {
            continue;
        }
        let _ = writeln!(md, "## {}\n", priority.label());
        for exam in exams {
            let mut line = format!("- **{}**", exam.name);
            if !exam.price.is_empty() {
                let _ = write!(line, " · {}", exam.price);
            }
            if !exam.description.is_empty() {
                let _ = write!(line, " - {}", exam.description);
            }
            let _ = writeln!(md, "{}", line);
        }
        md.push('\n');
    }

    if !related.packs.is_empty() {
        md.push_str("## Pacchetti Consigliati\n\n");
        for pack in &related.packs {
            let _ = writeln!(md, "- **{}** · {} ({})", pack.name, pack.price, pack.url());
        }
        md.push('\n');
    }

    let _ = writeln!(md, "Tutti gli esami: {}", related.lab_url);
    md
}

/// Summary of what a data directory load produced
pub fn format_report(data: &ClinicData) -> String {
    let mut md = String::from("# Catalogue\n\n");
    for (kind, count) in data.catalogue.counts() {
        if count > 0 {
            let _ = writeln!(md, "- {}: {}", kind.collection(), count);
        }
    }
    let _ = writeln!(md, "- index terms: {}", data.index.terms.len());
    let _ = writeln!(md, "- synonyms: {}", data.synonyms.synonyms.len());
    let _ = writeln!(md, "- symptoms: {}", data.symptoms.len());
    let _ = writeln!(md, "- related exam tables: {}", data.related.len());

    let report = &data.report;
    if report.is_clean() {
        md.push_str("\nNo problems found.\n");
        return md;
    }

    let _ = writeln!(
        md,
        "\n{} entries skipped, {} duplicates, {} files unreadable\n",
        report.skipped_entries,
        report.duplicates,
        report.skipped_files.len()
    );
    for warning in &report.warnings {
        let _ = writeln!(md, "- {}", warning);
    }
    md
}
