//! Text extraction from uploaded resume files.
//!
//! The format is decided from the file name alone, before any byte is parsed.
//! Parsing is CPU-bound and runs on the blocking pool via `extract_text_blocking`.

pub mod docx;
pub mod pdf;

use std::path::Path;

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Invalid file format. Please upload a PDF or DOCX file.")]
    UnsupportedFormat { file_name: String },

    #[error("Error reading PDF file: {0}")]
    Pdf(String),

    #[error("Error reading DOCX file: {0}")]
    Docx(String),
}

/// The two supported resume formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Page-oriented: pages are concatenated with no separator.
    Pdf,
    /// Paragraph-oriented: every paragraph is followed by a newline.
    Docx,
}

impl DocumentFormat {
    /// Resolves the format from the file name's extension, case-insensitively.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let extension = Path::new(file_name).extension()?.to_str()?.to_lowercase();
        match extension.as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            _ => None,
        }
    }

    fn failure(self, cause: String) -> ExtractionError {
        match self {
            DocumentFormat::Pdf => ExtractionError::Pdf(cause),
            DocumentFormat::Docx => ExtractionError::Docx(cause),
        }
    }
}

/// An uploaded file as received from the client. Lives for one request.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: String,
    pub bytes: Bytes,
}

impl UploadedDocument {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn format(&self) -> Result<DocumentFormat, ExtractionError> {
        DocumentFormat::from_file_name(&self.file_name).ok_or_else(|| {
            ExtractionError::UnsupportedFormat {
                file_name: self.file_name.clone(),
            }
        })
    }
}

/// Extracts plain text from the document on the current thread.
pub fn extract_text(document: &UploadedDocument) -> Result<String, ExtractionError> {
    let format = document.format()?;
    let text = match format {
        DocumentFormat::Pdf => pdf::extract(&document.bytes),
        DocumentFormat::Docx => docx::extract(&document.bytes),
    }
    .map_err(|cause| format.failure(cause))?;

    debug!(
        "Extracted {} chars from '{}' ({:?})",
        text.len(),
        document.file_name,
        format
    );
    Ok(text)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "parser panicked".to_string()
    }
}

/// Extracts plain text on tokio's blocking pool.
///
/// The extension check runs first, on the caller's task. A panic inside a
/// parser is reported as an extraction failure for that format.
pub async fn extract_text_blocking(document: UploadedDocument) -> Result<String, ExtractionError> {
    let format = document.format()?;
    tokio::task::spawn_blocking(move || extract_text(&document))
        .await
        .unwrap_or_else(|e| {
            warn!("Extraction task failed: {e}");
            Err(format.failure(format!("parser aborted: {e}")))
        })
}
