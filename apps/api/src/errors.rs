use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::extraction::ExtractionError;
use crate::interview::catalog::CatalogError;
use crate::interview::session::SessionError;

/// User-facing message for the not-a-resume warning.
pub const NOT_A_RESUME_MESSAGE: &str = "The uploaded file does not appear to be a resume.";

/// How loudly a failure is surfaced to the user.
/// A warning means the data was read but rejected by the heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

/// The four failure categories of an interaction cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnsupportedFormat,
    ExtractionFailure,
    NotAResume,
    GenerationFailure,
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    UnsupportedFormat(String),

    #[error("{0}")]
    Extraction(String),

    #[error("The uploaded file does not appear to be a resume.")]
    NotAResume,

    #[error("Error generating questions: {0}")]
    Generation(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl AppError {
    /// Category of the failure, if it belongs to the interaction taxonomy.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            AppError::UnsupportedFormat(_) => Some(ErrorKind::UnsupportedFormat),
            AppError::Extraction(_) => Some(ErrorKind::ExtractionFailure),
            AppError::NotAResume => Some(ErrorKind::NotAResume),
            AppError::Generation(_) => Some(ErrorKind::GenerationFailure),
            _ => None,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            AppError::NotAResume => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::UnsupportedFormat { ref file_name } => {
                tracing::debug!("Rejected '{file_name}' by extension");
                AppError::UnsupportedFormat(err.to_string())
            }
            other => AppError::Extraction(other.to_string()),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound(id) => AppError::NotFound(format!("Session {id} not found")),
            other => AppError::Conflict(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let severity = self.severity();
        let (status, code, message) = match &self {
            AppError::UnsupportedFormat(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_FORMAT",
                msg.clone(),
            ),
            AppError::Extraction(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EXTRACTION_FAILED",
                msg.clone(),
            ),
            AppError::NotAResume => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "NOT_A_RESUME",
                NOT_A_RESUME_MESSAGE.to_string(),
            ),
            AppError::Generation(_) => {
                tracing::error!("{self}");
                (StatusCode::BAD_GATEWAY, "GENERATION_FAILED", self.to_string())
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
                "severity": severity,
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_a_resume_is_a_warning() {
        assert_eq!(AppError::NotAResume.severity(), Severity::Warning);
        assert_eq!(AppError::NotAResume.kind(), Some(ErrorKind::NotAResume));
    }

    #[test]
    fn test_generation_message_carries_cause() {
        let err = AppError::Generation("rate limited".to_string());
        assert_eq!(err.to_string(), "Error generating questions: rate limited");
        assert_eq!(err.severity(), Severity::Error);
    }

    #[test]
    fn test_unsupported_extension_maps_to_unsupported_format() {
        let err: AppError = ExtractionError::UnsupportedFormat {
            file_name: "notes.txt".to_string(),
        }
        .into();
        assert_eq!(err.kind(), Some(ErrorKind::UnsupportedFormat));
        assert_eq!(
            err.to_string(),
            "Invalid file format. Please upload a PDF or DOCX file."
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::UnsupportedFormat(String::new()).into_response().status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            AppError::NotAResume.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::Generation("boom".to_string()).into_response().status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::Conflict("busy".to_string()).into_response().status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_taxonomy_excludes_plumbing_errors() {
        assert_eq!(AppError::Validation("x".to_string()).kind(), None);
        assert_eq!(AppError::NotFound("x".to_string()).kind(), None);
    }
}
