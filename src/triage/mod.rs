//! Symptom triage
//!
//! A [`TriageSession`] walks the questions of one [`Symptom`]. Each answer
//! may raise the urgency, add suggestions and extend the description; the
//! session then produces a [`TriageResult`]. Urgency only ever escalates.

use crate::catalogue::ClinicData;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TriageError {
    #[error("Unknown symptom: {0}")]
    UnknownSymptom(String),

    #[error("Unknown option '{value}' for question: {question}")]
    UnknownOption { value: String, question: String },

    #[error("Triage already finished")]
    Finished,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    #[default]
    Low,
    Medium,
    High,
    Emergency,
}

impl Urgency {
    pub fn label(&self) -> &'static str {
        match self {
            Urgency::Low => "Non urgente",
            Urgency::Medium => "Consigliato entro 1 settimana",
            Urgency::High => "Urgente - Entro 24-48h",
            Urgency::Emergency => "EMERGENZA",
        }
    }

    pub fn advice(&self) -> &'static str {
        match self {
            Urgency::Low => "Puoi prenotare una visita nei prossimi giorni.",
            Urgency::Medium => "È consigliabile una valutazione tempestiva.",
            Urgency::High => "Richiedi una valutazione prioritaria.",
            Urgency::Emergency => "Contatta immediatamente il 118 o recati al Pronto Soccorso.",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Catalogue ids to propose, by kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Suggestions {
    pub specialists: Vec<String>,
    pub exams: Vec<String>,
    pub packs: Vec<String>,
    pub pathways: Vec<String>,
    pub description: String,
}

/// Effect of picking an answer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifier {
    pub urgency: Option<Urgency>,
    #[serde(alias = "addSpecialists")]
    pub add_specialists: Vec<String>,
    #[serde(alias = "addExams")]
    pub add_exams: Vec<String>,
    #[serde(alias = "addPacks")]
    pub add_packs: Vec<String>,
    #[serde(alias = "addPathways")]
    pub add_pathways: Vec<String>,
    #[serde(alias = "addDescription")]
    pub add_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub label: String,
    pub value: String,
    #[serde(default)]
    pub modifier: Option<Modifier>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    pub options: Vec<QuestionOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symptom {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub suggestions: Suggestions,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default, alias = "redFlags")]
    pub red_flags: Vec<String>,
    #[serde(default, alias = "emergencyNote")]
    pub emergency_note: Option<String>,
}

/// Display label of a symptom category
pub fn category_label(category: &str) -> &str {
    match category {
        "generale" => "Sintomi Generali",
        "cardiologico" => "Cuore e Circolazione",
        "neurologico" => "Sistema Nervoso",
        "pneumologico" => "Respiratorio",
        "gastroenterologico" => "Apparato Digerente",
        "dermatologico" => "Pelle",
        "oculistico" => "Vista",
        "ortopedico" => "Ossa e Articolazioni",
        "urologico" => "Apparato Urinario",
        "ginecologico" => "Ginecologia",
        "metabolico" => "Metabolismo",
        "psicologico" => "Mente e Benessere",
        other => other,
    }
}

/// Symptoms grouped by category, categories in first-seen order
pub fn by_category(symptoms: &[Symptom]) -> Vec<(&str, Vec<&Symptom>)> {
    let mut groups: Vec<(&str, Vec<&Symptom>)> = Vec::new();
    for symptom in symptoms {
        match groups.iter().position(|(c, _)| *c == symptom.category) {
            Some(i) => groups[i].1.push(symptom),
            None => groups.push((symptom.category.as_str(), vec![symptom])),
        }
    }
    groups
}

/// A recorded answer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub question: String,
    pub answer: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriageResult {
    pub symptom_key: String,
    pub symptom_label: String,
    pub urgency: Urgency,
    pub urgency_label: &'static str,
    pub advice: &'static str,
    pub suggestions: Suggestions,
    pub description: String,
    pub answers: Vec<Answer>,
    pub red_flags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_note: Option<String>,
    pub is_emergency: bool,
}

/// What follows an answer
#[derive(Debug, Clone, PartialEq)]
pub enum Step<'a> {
    Question(&'a Question),
    Done(TriageResult),
}

#[derive(Debug, Clone)]
pub struct TriageSession<'a> {
    symptom: &'a Symptom,
    position: usize,
    urgency: Urgency,
    suggestions: Suggestions,
    extra_description: Vec<String>,
    answers: Vec<Answer>,
}

fn extend_unique(into: &mut Vec<String>, from: &[String]) {
    for id in from {
        if !into.contains(id) {
            into.push(id.clone());
        }
    }
}

impl<'a> TriageSession<'a> {
    pub fn start(symptom: &'a Symptom) -> Self {
        debug!("Starting triage for '{}'", symptom.key);
        Self {
            symptom,
            position: 0,
            urgency: symptom.urgency,
            suggestions: symptom.suggestions.clone(),
            extra_description: Vec::new(),
            answers: Vec::new(),
        }
    }

    /// Start a session for a symptom key in loaded data
    pub fn for_key(data: &'a ClinicData, key: &str) -> Result<Self, TriageError> {
        data.symptom(key)
            .map(Self::start)
            .ok_or_else(|| TriageError::UnknownSymptom(key.to_string()))
    }

    pub fn symptom(&self) -> &'a Symptom {
        self.symptom
    }

    pub fn current_question(&self) -> Option<&'a Question> {
        self.symptom.questions.get(self.position)
    }

    pub fn is_finished(&self) -> bool {
        self.current_question().is_none()
    }

    /// Answer the current question with an option value
    pub fn answer(&mut self, value: &str) -> Result<Step<'a>, TriageError> {
        let question = self.current_question().ok_or(TriageError::Finished)?;
        let option = question
            .options
            .iter()
            .find(|o| o.value == value)
            .ok_or_else(|| TriageError::UnknownOption {
                value: value.to_string(),
                question: question.text.clone(),
            })?;

        self.answers.push(Answer {
            question: question.text.clone(),
            answer: option.label.clone(),
            value: option.value.clone(),
        });
        if let Some(modifier) = &option.modifier {
            self.apply(modifier);
        }
        self.position += 1;

        Ok(match self.current_question() {
            Some(next) => Step::Question(next),
            None => Step::Done(self.result()),
        })
    }

    fn apply(&mut self, modifier: &Modifier) {
        if let Some(urgency) = modifier.urgency {
            self.urgency = self.urgency.max(urgency);
        }
        extend_unique(&mut self.suggestions.specialists, &modifier.add_specialists);
        extend_unique(&mut self.suggestions.exams, &modifier.add_exams);
        extend_unique(&mut self.suggestions.packs, &modifier.add_packs);
        extend_unique(&mut self.suggestions.pathways, &modifier.add_pathways);
        if let Some(extra) = &modifier.add_description {
            self.extra_description.push(extra.clone());
        }
    }

    /// Result so far; remaining questions are skipped
    pub fn result(&self) -> TriageResult {
        let mut description = self.symptom.suggestions.description.clone();
        for extra in &self.extra_description {
            if !description.is_empty() {
                description.push(' ');
            }
            description.push_str(extra);
        }

        TriageResult {
            symptom_key: self.symptom.key.clone(),
            symptom_label: self.symptom.label.clone(),
            urgency: self.urgency,
            urgency_label: self.urgency.label(),
            advice: self.urgency.advice(),
            suggestions: Suggestions {
                description: description.clone(),
                ..self.suggestions.clone()
            },
            description,
            answers: self.answers.clone(),
            red_flags: self.symptom.red_flags.clone(),
            emergency_note: self.symptom.emergency_note.clone(),
            is_emergency: self.urgency == Urgency::Emergency,
        }
    }
}

/// Run a whole session from a list of answer values. Answers beyond the
/// last question are an error; missing ones leave questions unanswered.
pub fn run(symptom: &Symptom, values: &[String]) -> Result<TriageResult, TriageError> {
    let mut session = TriageSession::start(symptom);
    for value in values {
        session.answer(value)?;
    }
    Ok(session.result())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::seed;

    #[test]
    fn test_walk_questions_to_result() {
        let data = seed::builtin();
        let mut session = TriageSession::for_key(&data, "stanchezza").unwrap();
        assert_eq!(
            session.current_question().unwrap().text,
            "La stanchezza è presente da quanto tempo?"
        );

        let step = session.answer("chronic").unwrap();
        assert!(matches!(step, Step::Question(q) if q.text.contains("peso")));

        let Step::Done(result) = session.answer("weight_gain").unwrap() else {
            panic!("expected final step");
        };
        assert_eq!(result.urgency, Urgency::Low);
        assert!(result.suggestions.exams.ends_with(&["cortisolo".to_string(), "vitamina-b12".to_string()]));
        assert_eq!(
            result.suggestions.packs,
            vec!["check-up-base", "check-up-tiroide-base", "check-up-tiroide-plus"]
        );
        assert_eq!(result.answers.len(), 2);
        assert_eq!(result.answers[1].answer, "Sì, aumento di peso");
        assert!(session.is_finished());
    }

    #[test]
    fn test_urgency_only_escalates() {
        let symptom = Symptom {
            key: "x".to_string(),
            label: "X".to_string(),
            category: String::new(),
            urgency: Urgency::Low,
            suggestions: Suggestions::default(),
            questions: vec![
                Question {
                    text: "q1".to_string(),
                    options: vec![QuestionOption {
                        label: "high".to_string(),
                        value: "high".to_string(),
                        modifier: Some(Modifier {
                            urgency: Some(Urgency::High),
                            ..Default::default()
                        }),
                    }],
                },
                Question {
                    text: "q2".to_string(),
                    options: vec![QuestionOption {
                        label: "medium".to_string(),
                        value: "medium".to_string(),
                        modifier: Some(Modifier {
                            urgency: Some(Urgency::Medium),
                            ..Default::default()
                        }),
                    }],
                },
            ],
            red_flags: Vec::new(),
            emergency_note: None,
        };

        let result = run(&symptom, &["high".to_string(), "medium".to_string()]).unwrap();
        assert_eq!(result.urgency, Urgency::High);
        assert_eq!(result.urgency_label, "Urgente - Entro 24-48h");
        assert!(!result.is_emergency);
    }

    #[test]
    fn test_emergency_answer() {
        let data = seed::builtin();
        let symptom = data.symptom("dolore_toracico").unwrap();
        let result = run(symptom, &["oppressive".to_string()]).unwrap();
        assert!(result.is_emergency);
        assert_eq!(result.urgency, Urgency::Emergency);
        assert!(result.emergency_note.unwrap().contains("118"));
    }

    #[test]
    fn test_description_accumulates() {
        let data = seed::builtin();
        let symptom = data.symptom("mal_di_testa").unwrap();
        let result = run(symptom, &["migraine".to_string()]).unwrap();
        assert!(result.description.starts_with("La cefalea"));
        assert!(result.description.ends_with(" Potrebbe trattarsi di emicrania."));
        assert_eq!(result.suggestions.description, result.description);
    }

    #[test]
    fn test_skip_to_result() {
        let data = seed::builtin();
        let session = TriageSession::for_key(&data, "dolore_toracico").unwrap();
        let result = session.result();
        assert_eq!(result.urgency, Urgency::High);
        assert!(result.answers.is_empty());
    }

    #[test]
    fn test_errors() {
        let data = seed::builtin();
        let err = TriageSession::for_key(&data, "tosse").unwrap_err();
        assert_eq!(err, TriageError::UnknownSymptom("tosse".to_string()));

        let mut session = TriageSession::for_key(&data, "dolore_toracico").unwrap();
        assert!(matches!(
            session.answer("nope"),
            Err(TriageError::UnknownOption { .. })
        ));
        session.answer("reflux").unwrap();
        assert_eq!(session.answer("reflux"), Err(TriageError::Finished));
    }

    #[test]
    fn test_symptom_json_accepts_camel_case() {
        let json = r#"{
            "key": "affanno",
            "label": "Difficoltà a respirare",
            "urgency": "medium",
            "questions": [{
                "text": "Quando?",
                "options": [{"label": "Di notte", "value": "nocturnal",
                             "modifier": {"addSpecialists": ["cardiologia"], "addExams": ["ecocardiogramma"]}}]
            }],
            "redFlags": ["labbra blu"],
            "emergencyNote": "Pronto Soccorso"
        }"#;
        let symptom: Symptom = serde_json::from_str(json).unwrap();
        assert_eq!(symptom.urgency, Urgency::Medium);
        assert_eq!(symptom.red_flags, vec!["labbra blu"]);

        let result = run(&symptom, &["nocturnal".to_string()]).unwrap();
        assert_eq!(result.suggestions.specialists, vec!["cardiologia"]);
        assert_eq!(result.suggestions.exams, vec!["ecocardiogramma"]);
    }

    #[test]
    fn test_by_category() {
        let data = seed::builtin();
        let groups = by_category(&data.symptoms);
        assert_eq!(groups[0].0, "generale");
        assert_eq!(category_label(groups[0].0), "Sintomi Generali");
        assert_eq!(category_label("altro"), "altro");
    }
}
