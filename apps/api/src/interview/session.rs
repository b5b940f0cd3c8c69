//! Interaction session — the explicit state machine behind the HTTP adapter.
//!
//! Transitions are pure; handlers perform the I/O (extraction, generation) and
//! feed the outcome back in. Sessions live in process memory only.
//!
//! ```text
//! Idle ─upload─► FileUploaded ─ok─► Validated ─select─► CategorySelected
//!                     │                  │                    │
//!                     └─fail─► ErrorShown ◄──── Generating ◄──┘ (trigger)
//!                                                   │
//!                                                   └─ok─► ResultShown
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::{AppError, ErrorKind, Severity};
use crate::interview::catalog::{exam_labels, CategorySelection};
use crate::interview::generator::GeneratedQuestionSet;

/// Shared in-memory session map.
pub type SessionStore = Arc<RwLock<HashMap<Uuid, Session>>>;

pub fn new_session_store() -> SessionStore {
    Arc::new(RwLock::new(HashMap::new()))
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Session {0} not found")]
    NotFound(Uuid),

    #[error("No validated resume in this session; upload a resume first")]
    NoResume,

    #[error("Questions are already being generated for this session")]
    AlreadyGenerating,

    #[error("This upload was superseded by a newer one")]
    UploadSuperseded,

    #[error("Cannot {action} while the session is {state:?}")]
    InvalidTransition {
        action: &'static str,
        state: SessionState,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    FileUploaded,
    Validated,
    CategorySelected,
    Generating,
    ResultShown,
    ErrorShown,
}

/// Message shown to the user after the last transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

impl Notice {
    fn success(message: String) -> Self {
        Self {
            level: NoticeLevel::Success,
            kind: None,
            message,
        }
    }

    fn from_error(err: &AppError) -> Self {
        Self {
            level: match err.severity() {
                Severity::Warning => NoticeLevel::Warning,
                Severity::Error => NoticeLevel::Error,
            },
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Identifies one upload attempt. Only the latest attempt may complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadTicket(u64);

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    state: SessionState,
    file_name: Option<String>,
    resume_text: Option<String>,
    selection: Option<CategorySelection>,
    questions: Option<GeneratedQuestionSet>,
    notice: Option<Notice>,
    uploads: u64,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            state: SessionState::Idle,
            file_name: None,
            resume_text: None,
            selection: None,
            questions: None,
            notice: None,
            uploads: 0,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[cfg(test)]
    pub fn resume_text(&self) -> Option<&str> {
        self.resume_text.as_deref()
    }

    #[cfg(test)]
    pub fn selection(&self) -> Option<&CategorySelection> {
        self.selection.as_ref()
    }

    #[cfg(test)]
    pub fn questions(&self) -> Option<&GeneratedQuestionSet> {
        self.questions.as_ref()
    }

    #[cfg(test)]
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// A new file arrived. Everything downstream of the upload is discarded,
    /// including the outcome of any upload still being extracted.
    pub fn begin_upload(&mut self, file_name: &str) -> Result<UploadTicket, SessionError> {
        if self.state == SessionState::Generating {
            return Err(SessionError::AlreadyGenerating);
        }
        self.uploads += 1;
        self.state = SessionState::FileUploaded;
        self.file_name = Some(file_name.to_string());
        self.resume_text = None;
        self.selection = None;
        self.questions = None;
        self.notice = None;
        Ok(UploadTicket(self.uploads))
    }

    /// Extraction succeeded and the validator accepted the text.
    /// The selection starts at the first family and its first sub-category.
    pub fn accept_resume(&mut self, ticket: UploadTicket, text: String) -> Result<(), SessionError> {
        self.expect_current_upload(ticket)?;
        self.expect_state("accept a resume", &[SessionState::FileUploaded])?;
        let file_name = self.file_name.as_deref().unwrap_or_default();
        self.notice = Some(Notice::success(format!(
            "Successfully uploaded and validated resume: {file_name}"
        )));
        self.resume_text = Some(text);
        self.selection = Some(CategorySelection::default());
        self.state = SessionState::Validated;
        Ok(())
    }

    /// Extraction failed or the validator rejected the text. No text is kept.
    pub fn reject_upload(&mut self, ticket: UploadTicket, err: &AppError) -> Result<(), SessionError> {
        self.expect_current_upload(ticket)?;
        self.expect_state("reject an upload", &[SessionState::FileUploaded])?;
        self.resume_text = None;
        self.selection = None;
        self.notice = Some(Notice::from_error(err));
        self.state = SessionState::ErrorShown;
        Ok(())
    }

    /// Changes the exam family and/or sub-category. Clears any prior result
    /// and any error left by a failed generation.
    pub fn select(&mut self, exam: &str, sub_category: Option<&str>) -> Result<(), AppError> {
        if self.state == SessionState::Generating {
            return Err(SessionError::AlreadyGenerating.into());
        }
        let current = self.selection.ok_or(SessionError::NoResume)?;
        if self.resume_text.is_none() {
            return Err(SessionError::NoResume.into());
        }

        self.selection = Some(current.reselect(exam, sub_category)?);
        self.questions = None;
        self.clear_error_notice();
        self.state = SessionState::CategorySelected;
        Ok(())
    }

    /// Explicit trigger. Returns the inputs for the generation call.
    pub fn start_generation(&mut self) -> Result<(String, CategorySelection), SessionError> {
        match self.state {
            SessionState::Generating => return Err(SessionError::AlreadyGenerating),
            SessionState::Validated
            | SessionState::CategorySelected
            | SessionState::ResultShown
            | SessionState::ErrorShown => {}
            state => {
                return Err(SessionError::InvalidTransition {
                    action: "generate questions",
                    state,
                })
            }
        }

        let (Some(text), Some(selection)) = (self.resume_text.clone(), self.selection) else {
            return Err(SessionError::NoResume);
        };

        self.questions = None;
        self.clear_error_notice();
        self.state = SessionState::Generating;
        Ok((text, selection))
    }

    /// Records the outcome of the generation call.
    /// A failure leaves the resume text and selection untouched.
    pub fn finish_generation(
        &mut self,
        outcome: &Result<GeneratedQuestionSet, AppError>,
    ) -> Result<(), SessionError> {
        self.expect_state("finish generation", &[SessionState::Generating])?;
        match outcome {
            Ok(questions) => {
                self.questions = Some(questions.clone());
                self.state = SessionState::ResultShown;
            }
            Err(err) => {
                self.notice = Some(Notice::from_error(err));
                self.state = SessionState::ErrorShown;
            }
        }
        Ok(())
    }

    fn expect_current_upload(&self, ticket: UploadTicket) -> Result<(), SessionError> {
        if ticket.0 == self.uploads {
            Ok(())
        } else {
            Err(SessionError::UploadSuperseded)
        }
    }

    /// The upload success notice stays until the next upload.
    fn clear_error_notice(&mut self) {
        if self
            .notice
            .as_ref()
            .is_some_and(|n| n.level != NoticeLevel::Success)
        {
            self.notice = None;
        }
    }

    fn expect_state(
        &self,
        action: &'static str,
        allowed: &[SessionState],
    ) -> Result<(), SessionError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                action,
                state: self.state,
            })
        }
    }

    /// What the client renders for this session.
    pub fn view(&self) -> SessionView {
        SessionView {
            session_id: self.id,
            created_at: self.created_at,
            state: self.state,
            file_name: self.file_name.clone(),
            notice: self.notice.clone(),
            selection: self.selection,
            exam_options: self.selection.map(|_| exam_labels()).unwrap_or_default(),
            sub_category_options: self
                .selection
                .map(|s| s.family().sub_categories.to_vec())
                .unwrap_or_default(),
            questions: self.questions.clone(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub state: SessionState,
    pub file_name: Option<String>,
    pub notice: Option<Notice>,
    pub selection: Option<CategorySelection>,
    pub exam_options: Vec<&'static str>,
    pub sub_category_options: Vec<&'static str>,
    pub questions: Option<GeneratedQuestionSet>,
}
