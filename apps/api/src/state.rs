use std::sync::Arc;

use crate::config::Config;
use crate::interview::session::SessionStore;
use crate::llm_client::CompletionService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Text-generation backend. `LlmClient` in production, a fake in tests.
    pub llm: Arc<dyn CompletionService>,
    /// In-memory interaction sessions; forgotten on restart.
    pub sessions: SessionStore,
    pub config: Config,
}
