//! Question generation — one prompt, one completion call, trimmed first choice.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::interview::catalog::CategorySelection;
use crate::interview::prompts::{
    QUESTION_COUNT, QUESTION_PROMPT_TEMPLATE, RESUME_END_MARKER, RESUME_START_MARKER,
};
use crate::llm_client::CompletionService;

/// Heading the generated text is presented under.
pub const QUESTIONS_HEADING: &str = "Generated Questions";

/// The service's answer, kept as opaque text.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedQuestionSet {
    pub heading: &'static str,
    pub text: String,
    pub exam: &'static str,
    pub sub_category: &'static str,
    pub generated_at: DateTime<Utc>,
}

/// Builds the generation prompt.
///
/// The resume text is substituted last so placeholder-like text inside a resume
/// is never expanded.
pub fn build_prompt(resume_text: &str, selection: &CategorySelection) -> String {
    QUESTION_PROMPT_TEMPLATE
        .replace("{sub_category}", selection.sub_category())
        .replace("{exam}", selection.exam_value())
        .replace("{question_count}", &QUESTION_COUNT.to_string())
        .replace("{start_marker}", RESUME_START_MARKER)
        .replace("{end_marker}", RESUME_END_MARKER)
        .replace("{resume_text}", resume_text)
}

/// Sends one completion request and returns the trimmed first choice.
/// No retry: a failure is reported once with the underlying message.
pub async fn generate_questions(
    llm: &dyn CompletionService,
    resume_text: &str,
    selection: &CategorySelection,
) -> Result<GeneratedQuestionSet, AppError> {
    let prompt = build_prompt(resume_text, selection);
    info!(
        "Generating questions for '{}' / '{}' (prompt {} chars)",
        selection.exam_label(),
        selection.sub_category(),
        prompt.len()
    );

    let text = llm
        .complete(&prompt)
        .await
        .map_err(|e| AppError::Generation(e.to_string()))?;

    Ok(GeneratedQuestionSet {
        heading: QUESTIONS_HEADING,
        text: text.trim().to_string(),
        exam: selection.exam_label(),
        sub_category: selection.sub_category(),
        generated_at: Utc::now(),
    })
}
