// Prompt template for question generation.

/// Marker opening the verbatim resume block.
pub const RESUME_START_MARKER: &str = "--- RESUME START ---";
/// Marker closing the verbatim resume block.
pub const RESUME_END_MARKER: &str = "--- RESUME END ---";

/// Number of questions the model is asked for. Not enforced on the output.
pub const QUESTION_COUNT: u32 = 10;

/// Question generation prompt template.
/// Replace: {sub_category}, {exam}, {question_count}, {start_marker},
/// {end_marker}, then {resume_text} last.
pub const QUESTION_PROMPT_TEMPLATE: &str = r#"
You are an expert interviewer preparing questions for a '{sub_category}' aspirant.
A candidate has submitted the following resume for evaluation:

{start_marker}
{resume_text}
{end_marker}

Your task is to generate {question_count} insightful interview questions. These questions should be directly based on the candidate's resume (their projects, experiences, and skills) but framed within the context of the '{exam}' exam. The goal is to assess how well the candidate can apply their practical experience to the theoretical concepts and problem-solving skills required for this exam.

Generate the questions now.
"#;
