//! Built-in reference data: care pathways, specialties, a synonym table and
//! a handful of triage symptoms. Used on its own when no data directory is
//! given, and appended after loaded data otherwise.

use super::types::{EntityKind, SearchableItem};
use super::{Catalogue, ClinicData};
use crate::search::{SynonymEntry, SynonymTable};
use crate::triage::{Modifier, Question, QuestionOption, Suggestions, Symptom, Urgency};

struct PathwaySeed {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    tags: &'static [&'static str],
}

const PATHWAYS: &[PathwaySeed] = &[
    PathwaySeed {
        id: "slim-care",
        name: "Slim Care",
        description: "Percorso dimagrimento con Wegovy e Mounjaro",
        tags: &["dimagrimento", "peso", "obesità", "wegovy", "mounjaro", "ozempic"],
    },
    PathwaySeed {
        id: "slim-care-donna",
        name: "Slim Care Donna",
        description: "Percorso dimagrimento specifico per donne con PCOS e menopausa",
        tags: &["donna", "pcos", "menopausa", "dimagrimento", "peso"],
    },
    PathwaySeed {
        id: "pma-fertilita",
        name: "PMA / Fertilità",
        description: "Procreazione Medicalmente Assistita e percorsi fertilità",
        tags: &["fertilità", "pma", "fecondazione", "gravidanza", "infertilità", "icsi", "fivet"],
    },
];

const SPECIALTIES: &[(&str, &str, &[&str])] = &[
    ("ginecologia", "Ginecologia", &["ginecologo", "ginecologia", "utero", "ovaie", "pap test"]),
    ("cardiologia", "Cardiologia", &["cardiologo", "cardiologia", "cuore", "ecg", "holter"]),
    ("endocrinologia", "Endocrinologia", &["endocrinologo", "tiroide", "diabete", "ormoni"]),
    ("dermatologia", "Dermatologia", &["dermatologo", "pelle", "nei", "nevi", "acne"]),
    ("neurologia", "Neurologia", &["neurologo", "cervello", "emicrania", "mal di testa"]),
    ("ortopedia", "Ortopedia", &["ortopedico", "ossa", "ginocchio", "spalla", "schiena"]),
    ("oculistica", "Oculistica", &["oculista", "occhi", "vista", "miopia"]),
    ("urologia", "Urologia", &["urologo", "prostata", "psa", "reni", "vescica"]),
    ("gastroenterologia", "Gastroenterologia", &["gastroenterologo", "stomaco", "intestino", "colon"]),
    ("pneumologia", "Pneumologia", &["pneumologo", "polmoni", "asma", "bronchi"]),
];

const MISSPELLINGS: &[(&str, &str)] = &[
    ("tiroidde", "tiroide"),
    ("tirode", "tiroide"),
    ("ginecolgo", "ginecologo"),
    ("cardiolgo", "cardiologo"),
    ("endocrinolgo", "endocrinologo"),
    ("emocrmo", "emocromo"),
];

const ALIASES: &[(&str, &str)] = &[
    ("check up", "checkup"),
    ("esami del sangue", "emocromo"),
    ("ecografia", "eco"),
];

fn pathways() -> impl Iterator<Item = SearchableItem> {
    PATHWAYS.iter().map(|p| {
        SearchableItem::new(EntityKind::Pathway, p.id, p.name)
            .with_description(p.description)
            .with_name_keyword()
            .with_tags(p.tags)
            .featured()
    })
}

fn specialists() -> impl Iterator<Item = SearchableItem> {
    SPECIALTIES.iter().map(|(id, name, keywords)| {
        SearchableItem::new(EntityKind::Specialist, *id, *name)
            .with_description(format!("Visita {}", name))
            .with_url(format!("/pages/{}.html", id))
            .with_tags(*keywords)
    })
}

/// Each specialty answers to its practitioner noun: "cardiologo" -> "cardiologia"
fn synonyms() -> SynonymTable {
    let mut table = SynonymTable::default();
    for (id, _, keywords) in SPECIALTIES {
        let practitioner = keywords[0];
        let mut alternatives = vec![practitioner.to_string()];
        let feminine = format!("{}a", &practitioner[..practitioner.len() - 1]);
        if feminine != practitioner {
            alternatives.push(feminine);
        }
        table.synonyms.insert(
            (*id).to_string(),
            SynonymEntry {
                primary: (*id).to_string(),
                alternatives,
            },
        );
    }
    for (wrong, right) in MISSPELLINGS {
        table
            .common_misspellings
            .insert((*wrong).to_string(), (*right).to_string());
    }
    for (alias, target) in ALIASES {
        table.aliases.insert((*alias).to_string(), (*target).to_string());
    }
    table.normalized()
}

fn option(label: &str, value: &str, modifier: Option<Modifier>) -> QuestionOption {
    QuestionOption {
        label: label.to_string(),
        value: value.to_string(),
        modifier,
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn symptoms() -> Vec<Symptom> {
    vec![
        Symptom {
            key: "stanchezza".to_string(),
            label: "Stanchezza cronica".to_string(),
            category: "generale".to_string(),
            urgency: Urgency::Low,
            suggestions: Suggestions {
                specialists: strings(&["endocrinologia", "medicina-interna"]),
                exams: strings(&["emocromo", "ferritina", "vitamina-d", "tsh", "glicemia"]),
                packs: strings(&["check-up-base", "check-up-tiroide-base"]),
                pathways: Vec::new(),
                description: "La stanchezza persistente può avere molte cause: carenze nutrizionali, problemi tiroidei, anemia o diabete.".to_string(),
            },
            questions: vec![
                Question {
                    text: "La stanchezza è presente da quanto tempo?".to_string(),
                    options: vec![
                        option(
                            "Meno di 2 settimane",
                            "acute",
                            Some(Modifier {
                                urgency: Some(Urgency::Medium),
                                ..Default::default()
                            }),
                        ),
                        option("2-4 settimane", "subacute", None),
                        option(
                            "Più di 1 mese",
                            "chronic",
                            Some(Modifier {
                                add_exams: strings(&["cortisolo", "vitamina-b12"]),
                                ..Default::default()
                            }),
                        ),
                    ],
                },
                Question {
                    text: "Hai notato anche perdita o aumento di peso?".to_string(),
                    options: vec![
                        option(
                            "Sì, perdita di peso",
                            "weight_loss",
                            Some(Modifier {
                                add_specialists: strings(&["oncologia"]),
                                urgency: Some(Urgency::Medium),
                                ..Default::default()
                            }),
                        ),
                        option(
                            "Sì, aumento di peso",
                            "weight_gain",
                            Some(Modifier {
                                add_packs: strings(&["check-up-tiroide-plus"]),
                                ..Default::default()
                            }),
                        ),
                        option("No, peso stabile", "stable", None),
                    ],
                },
            ],
            red_flags: Vec::new(),
            emergency_note: None,
        },
        Symptom {
            key: "mal_di_testa".to_string(),
            label: "Mal di testa / Cefalea".to_string(),
            category: "neurologico".to_string(),
            urgency: Urgency::Low,
            suggestions: Suggestions {
                specialists: strings(&["neurologia"]),
                description: "La cefalea può essere primaria (emicrania, cefalea tensiva) o secondaria ad altre condizioni.".to_string(),
                ..Default::default()
            },
            questions: vec![Question {
                text: "Com'è il tuo mal di testa?".to_string(),
                options: vec![
                    option(
                        "Pulsante, spesso da un lato",
                        "migraine",
                        Some(Modifier {
                            add_description: Some("Potrebbe trattarsi di emicrania.".to_string()),
                            ..Default::default()
                        }),
                    ),
                    option(
                        "Come una fascia stretta",
                        "tension",
                        Some(Modifier {
                            add_description: Some("Potrebbe essere una cefalea tensiva.".to_string()),
                            ..Default::default()
                        }),
                    ),
                    option(
                        "Improvviso e molto forte",
                        "severe",
                        Some(Modifier {
                            urgency: Some(Urgency::Emergency),
                            add_description: Some(
                                "Un mal di testa improvviso e molto intenso richiede valutazione urgente."
                                    .to_string(),
                            ),
                            ..Default::default()
                        }),
                    ),
                ],
            }],
            red_flags: strings(&["improvviso e molto forte", "febbre", "rigidità collo", "confusione"]),
            emergency_note: None,
        },
        Symptom {
            key: "dolore_toracico".to_string(),
            label: "Dolore al petto".to_string(),
            category: "cardiologico".to_string(),
            urgency: Urgency::High,
            suggestions: Suggestions {
                specialists: strings(&["cardiologia"]),
                exams: strings(&["ecg", "troponina"]),
                packs: strings(&["check-up-cardiologico-plus"]),
                pathways: strings(&["checkup-cardiovascolare"]),
                description: "Il dolore toracico richiede sempre una valutazione cardiologica per escludere cause cardiache.".to_string(),
            },
            questions: vec![Question {
                text: "Come descriveresti il dolore?".to_string(),
                options: vec![
                    option(
                        "Oppressivo, come un peso",
                        "oppressive",
                        Some(Modifier {
                            urgency: Some(Urgency::Emergency),
                            ..Default::default()
                        }),
                    ),
                    option(
                        "Puntorio, aumenta con il respiro",
                        "pleuritic",
                        Some(Modifier {
                            add_specialists: strings(&["pneumologia"]),
                            ..Default::default()
                        }),
                    ),
                    option(
                        "Bruciore, peggiora dopo i pasti",
                        "reflux",
                        Some(Modifier {
                            add_specialists: strings(&["gastroenterologia"]),
                            ..Default::default()
                        }),
                    ),
                ],
            }],
            red_flags: strings(&["oppressivo", "irradiato al braccio", "sudorazione fredda", "affanno"]),
            emergency_note: Some(
                "Se il dolore è forte, oppressivo e si irradia al braccio sinistro, chiama il 118 immediatamente."
                    .to_string(),
            ),
        },
    ]
}

/// The built-in data set
pub fn builtin() -> ClinicData {
    ClinicData {
        catalogue: Catalogue::from_items(pathways().chain(specialists())),
        synonyms: synonyms(),
        symptoms: symptoms(),
        related: super::related::builtin(),
        ..Default::default()
    }
}
