//! Error types for catalogue loading, configuration and triage

use crate::triage::TriageError;
use thiserror::Error;

/// Library error type.
///
/// Nothing in the search path is fatal: a short query, a missing catalogue
/// or a malformed entry all degrade to fewer results. These variants cover
/// the places where a caller has to decide what to do.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Catalogue unavailable: {0}")]
    CatalogueUnavailable(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Triage error: {0}")]
    Triage(#[from] TriageError),
    #[error("No related exams for specialty: {0}")]
    UnknownSpecialty(String),
}

impl SearchError {
    /// Stable machine-readable code, printed with CLI errors
    pub fn error_code(&self) -> &'static str {
        match self {
            SearchError::Io(_) => "io_error",
            SearchError::Json(_) => "json_error",
            SearchError::CatalogueUnavailable(_) => "catalogue_unavailable",
            SearchError::InvalidConfig(_) => "invalid_config",
            SearchError::Triage(_) => "triage_error",
            SearchError::UnknownSpecialty(_) => "unknown_specialty",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_error_display() {
        let error = SearchError::CatalogueUnavailable("data/ missing".to_string());
        assert_eq!(error.to_string(), "Catalogue unavailable: data/ missing");

        let error = SearchError::InvalidConfig("min_query_length must be at least 1".to_string());
        assert_eq!(
            error.to_string(),
            "Invalid configuration: min_query_length must be at least 1"
        );

        let error = SearchError::Triage(TriageError::UnknownSymptom("tosse".to_string()));
        assert_eq!(error.to_string(), "Triage error: Unknown symptom: tosse");
    }

    #[test]
    fn test_error_codes() {
        let io = SearchError::from(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        assert_eq!(io.error_code(), "io_error");

        let json = SearchError::from(serde_json::from_str::<u32>("nope").unwrap_err());
        assert_eq!(json.error_code(), "json_error");

        assert_eq!(
            SearchError::CatalogueUnavailable(String::new()).error_code(),
            "catalogue_unavailable"
        );
        assert_eq!(
            SearchError::UnknownSpecialty("psichiatria".to_string()).error_code(),
            "unknown_specialty"
        );
    }
}
