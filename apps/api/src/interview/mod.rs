// Interview question workflow: validate a resume, pick an exam, generate questions.
// All LLM calls go through llm_client.

pub mod catalog;
pub mod generator;
pub mod handlers;
pub mod prompts;
pub mod session;
pub mod validation;
