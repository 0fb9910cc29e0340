//! Lab exams recommended alongside a specialist visit
//!
//! Keyed by specialty slug (`cardiologia`, `ginecologia`, ...), the same slug
//! the specialty pages use. A data directory may ship `related-exams.json`
//! with the same shape; its entries replace the built-in ones per specialty.

use crate::search::normalize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// When an exam is worth doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamPriority {
    /// Useful for every patient of the specialty
    High,
    /// Useful depending on symptoms
    Medium,
    /// Only on the specialist's request
    Specialist,
}

impl ExamPriority {
    pub const ALL: [ExamPriority; 3] = [
        ExamPriority::High,
        ExamPriority::Medium,
        ExamPriority::Specialist,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ExamPriority::High => "Consigliati per tutti",
            ExamPriority::Medium => "Utili in base ai sintomi",
            ExamPriority::Specialist => "Su indicazione dello specialista",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedExam {
    pub name: String,
    #[serde(default, alias = "desc")]
    pub description: String,
    /// Display price, kept verbatim ("€15", "da €25")
    #[serde(default)]
    pub price: String,
    pub priority: ExamPriority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedPack {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub price: String,
}

impl RelatedPack {
    /// Anchor of the pack on the lab page
    pub fn url(&self) -> String {
        format!("/laboratorio/index.html#pack-{}", self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedExams {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub exams: Vec<RelatedExam>,
    #[serde(default)]
    pub packs: Vec<RelatedPack>,
    #[serde(default = "default_lab_url", alias = "labUrl")]
    pub lab_url: String,
}

fn default_title() -> String {
    "Esami Consigliati".to_string()
}

fn default_lab_url() -> String {
    "/laboratorio/index.html".to_string()
}

impl RelatedExams {
    /// Exams of one priority, in table order
    pub fn with_priority(&self, priority: ExamPriority) -> impl Iterator<Item = &RelatedExam> {
        self.exams.iter().filter(move |e| e.priority == priority)
    }
}

/// Specialty slug to recommended exams
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelatedTable(BTreeMap<String, RelatedExams>);

impl RelatedTable {
    /// Look a specialty up by slug, page path or display name
    /// (`cardiologia`, `/pages/cardiologia.html`, `Cardiologia`)
    pub fn get(&self, specialty: &str) -> Option<&RelatedExams> {
        let slug = page_slug(specialty);
        self.0.get(&slug)
    }

    pub fn specialties(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keys normalized to slugs
    pub fn normalized(self) -> Self {
        Self(
            self.0
                .into_iter()
                .map(|(key, value)| (page_slug(&key), value))
                .collect(),
        )
    }

    /// Entries of `other` replace ours for the same specialty
    pub fn merge(&mut self, other: RelatedTable) {
        self.0.extend(other.0);
    }

    pub fn insert(&mut self, specialty: &str, exams: RelatedExams) {
        self.0.insert(page_slug(specialty), exams);
    }
}

fn page_slug(specialty: &str) -> String {
    let stem = specialty
        .trim()
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .trim_end_matches(".html");
    normalize(&stem.replace('-', " "))
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

fn exam(name: &str, description: &str, price: &str, priority: ExamPriority) -> RelatedExam {
    RelatedExam {
        name: name.to_string(),
        description: description.to_string(),
        price: price.to_string(),
        priority,
    }
}

fn pack(id: &str, name: &str, price: &str) -> RelatedPack {
    RelatedPack {
        id: id.to_string(),
        name: name.to_string(),
        price: price.to_string(),
    }
}

fn entry(
    description: &str,
    exams: Vec<RelatedExam>,
    packs: Vec<RelatedPack>,
    lab_url: &str,
) -> RelatedExams {
    RelatedExams {
        title: default_title(),
        description: description.to_string(),
        exams,
        packs,
        lab_url: lab_url.to_string(),
    }
}

/// The clinic's own recommendations for its ten specialties
pub fn builtin() -> RelatedTable {
    use ExamPriority::{High, Medium, Specialist};

    let mut table = RelatedTable::default();
    table.insert(
        "cardiologia",
        entry(
            "Prima o dopo la visita cardiologica, questi esami forniscono informazioni utili",
            vec![
                exam("Profilo Lipidico Completo", "Colesterolo totale, HDL, LDL, Trigliceridi", "€15", High),
                exam("Glicemia", "Screening diabete, fattore di rischio cardiovascolare", "€3", High),
                exam("Emoglobina Glicata (HbA1c)", "Controllo diabete a lungo termine", "€12", Medium),
                exam("Creatinina + eGFR", "Funzionalità renale", "€5", Medium),
                exam("BNP / NT-proBNP", "Marker di scompenso cardiaco", "€35", Specialist),
                exam("Troponina", "Marker di danno cardiaco (su indicazione)", "€25", Specialist),
            ],
            vec![pack("check-up-cardiologico-plus", "Check-Up Cardiologico Plus", "€185")],
            "/laboratorio/index.html?q=cardiovascolare",
        ),
    );
    table.insert(
        "neurologia",
        entry(
            "Esami utili per escludere cause metaboliche di sintomi neurologici",
            vec![
                exam("Emocromo Completo", "Anemia può causare sintomi neurologici", "€6", High),
                exam("TSH", "Disfunzioni tiroidee causano sintomi neurologici", "€8", High),
                exam("Vitamina B12", "Carenza causa neuropatie e disturbi cognitivi", "€15", High),
                exam("Acido Folico", "Carenza associata a disturbi neurologici", "€12", Medium),
                exam("Glicemia", "Diabete causa neuropatie periferiche", "€3", Medium),
                exam("VES + PCR", "Marker infiammatori", "€10", Medium),
            ],
            vec![pack("check-up-base", "Check-Up Base", "€39")],
            "/laboratorio/index.html",
        ),
    );
    table.insert(
        "ginecologia",
        entry(
            "Esami di laboratorio per la salute femminile",
            vec![
                exam("Emocromo + Sideremia + Ferritina", "Anemia frequente nelle donne", "€18", High),
                exam("TSH", "Tiroide influenza ciclo e fertilità", "€8", High),
                exam("Pap-Test / HPV Test", "Screening tumore cervice", "da €25", High),
                exam("Tampone Vaginale", "In caso di perdite o sintomi", "€20", Medium),
                exam("Ormoni Femminili", "FSH, LH, Estradiolo, Progesterone", "€45", Specialist),
                exam("AMH (Riserva Ovarica)", "Per valutazione fertilità", "€50", Specialist),
            ],
            vec![
                pack("check-up-donna-under-40", "Check-Up Donna Under 40", "€89"),
                pack("check-up-donna-over-40", "Check-Up Donna Over 40", "€129"),
                pack("check-up-pre-gravidanza", "Check-Up Pre-Gravidanza", "€99"),
            ],
            "/laboratorio/index.html?q=donna",
        ),
    );
    table.insert(
        "dermatologia",
        entry(
            "Esami per identificare cause interne di problemi cutanei",
            vec![
                exam("Emocromo Completo", "Anemia e carenze", "€6", Medium),
                exam("Ferritina + Sideremia", "Carenza ferro causa perdita capelli", "€12", High),
                exam("TSH + FT4", "Tiroide influenza pelle e capelli", "€15", High),
                exam("Vitamina D", "Carenza associata a problemi cutanei", "€18", Medium),
                exam("Zinco", "Importante per la salute di pelle e capelli", "€15", Medium),
                exam("IgE Totali + PRIST", "Screening allergie", "€25", Specialist),
            ],
            vec![pack("check-up-tiroide-plus", "Check-Up Tiroide Plus", "€59")],
            "/laboratorio/index.html?q=tiroide",
        ),
    );
    table.insert(
        "endocrinologia",
        entry(
            "Esami per valutare il sistema ormonale",
            vec![
                exam("TSH + FT3 + FT4", "Funzione tiroidea completa", "€25", High),
                exam("Anti-TPO + Anti-TG", "Anticorpi tiroidei (tiroidite)", "€30", High),
                exam("Glicemia + HbA1c", "Screening e controllo diabete", "€15", High),
                exam("Profilo Lipidico", "Colesterolo e trigliceridi", "€15", Medium),
                exam("Cortisolo", "Funzione surrenalica", "€18", Specialist),
                exam("Insulina", "Insulino-resistenza", "€15", Specialist),
            ],
            vec![
                pack("check-up-tiroide-base", "Check-Up Tiroide Base", "€29"),
                pack("check-up-tiroide-plus", "Check-Up Tiroide Plus", "€59"),
            ],
            "/laboratorio/index.html?q=tiroide",
        ),
    );
    table.insert(
        "ortopedia",
        entry(
            "Esami utili in ambito ortopedico",
            vec![
                exam("VES + PCR", "Marker infiammatori (artrite)", "€10", Medium),
                exam("Acido Urico", "Gotta, artrite gottosa", "€5", Medium),
                exam("Vitamina D", "Importante per la salute ossea", "€18", High),
                exam("Calcio + Fosforo", "Metabolismo osseo", "€8", Medium),
                exam("Fattore Reumatoide + Anti-CCP", "Artrite reumatoide", "€35", Specialist),
                exam("ANA (Anticorpi Anti-Nucleo)", "Malattie autoimmuni", "€25", Specialist),
            ],
            Vec::new(),
            "/laboratorio/index.html?q=infiammazione",
        ),
    );
    table.insert(
        "urologia",
        entry(
            "Esami per la salute urologica maschile",
            vec![
                exam("PSA Totale", "Screening prostata (over 50)", "€12", High),
                exam("PSA Libero + Rapporto", "Approfondimento se PSA elevato", "€25", Specialist),
                exam("Esame Urine + Urinocoltura", "Infezioni urinarie", "€15", High),
                exam("Creatinina + Azotemia", "Funzionalità renale", "€8", Medium),
                exam("Testosterone", "Se sintomi di ipogonadismo", "€20", Specialist),
                exam("Citologia Urinaria", "Se sangue nelle urine", "€30", Specialist),
            ],
            vec![pack("check-up-uomo-over-40", "Check-Up Uomo Over 40", "€119")],
            "/laboratorio/index.html?q=psa",
        ),
    );
    table.insert(
        "pneumologia",
        entry(
            "Esami di laboratorio in ambito respiratorio",
            vec![
                exam("Emocromo Completo", "Eosinofili alti indicano allergia/asma", "€6", High),
                exam("IgE Totali", "Screening allergico", "€15", Medium),
                exam("Alfa-1-Antitripsina", "Enfisema ereditario", "€25", Specialist),
                exam("D-Dimero", "Sospetta embolia (su indicazione)", "€18", Specialist),
                exam("BNP", "Escludere causa cardiaca di dispnea", "€35", Specialist),
                exam("Emogasanalisi", "Scambi respiratori (in struttura)", "€20", Specialist),
            ],
            Vec::new(),
            "/laboratorio/index.html",
        ),
    );
    table.insert(
        "oculistica",
        entry(
            "Esami utili in ambito oculistico",
            vec![
                exam("Glicemia + HbA1c", "Diabete causa retinopatia", "€15", High),
                exam("Profilo Lipidico", "Arterosclerosi retinica", "€15", Medium),
                exam("Emocromo", "Anemia, trombocitopenia", "€6", Medium),
                exam("VES + PCR", "Uveiti e infiammazioni oculari", "€10", Medium),
                exam("ANA + ENA", "Malattie autoimmuni (uveite)", "€45", Specialist),
            ],
            vec![pack("check-up-base", "Check-Up Base", "€39")],
            "/laboratorio/index.html?q=glicemia",
        ),
    );
    table.insert(
        "gastroenterologia",
        entry(
            "Esami di laboratorio per l'apparato digerente",
            vec![
                exam("Emocromo Completo", "Anemia da sanguinamento occulto", "€6", High),
                exam("Sideremia + Ferritina", "Carenza ferro (malassorbimento, emorragie)", "€12", High),
                exam("Transaminasi (AST, ALT)", "Funzione epatica", "€8", High),
                exam("GGT + Bilirubina", "Vie biliari", "€10", Medium),
                exam("Calprotectina Fecale", "Infiammazione intestinale (IBD)", "€35", Specialist),
                exam("Sangue Occulto Fecale", "Screening colon (over 50)", "€10", High),
                exam("Test Helicobacter (Urea Breath)", "Infezione H. pylori", "€30", Specialist),
            ],
            vec![pack("check-up-profilo-epatico", "Check-Up Profilo Epatico", "€45")],
            "/laboratorio/index.html?q=epatico",
        ),
    );
    table
}
