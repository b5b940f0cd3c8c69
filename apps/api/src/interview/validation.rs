//! Resume heuristic — keyword presence, not structural parsing.

/// Any one of these, found anywhere in the lowercased text, marks a resume.
pub const RESUME_KEYWORDS: &[&str] = &[
    "resume",
    "curriculum vitae",
    "experience",
    "education",
    "skills",
];

/// Returns true if the text plausibly is a resume.
///
/// Plain substring containment: "experienced chef" matches "experience".
/// That false positive is accepted.
pub fn looks_like_resume(text: &str) -> bool {
    let text_lower = text.to_lowercase();
    RESUME_KEYWORDS
        .iter()
        .any(|keyword| text_lower.contains(keyword))
}
