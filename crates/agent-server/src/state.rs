//! Application State

use std::sync::Arc;

use agent_core::{LlmProvider, SessionManager};
use rag_assistant::{Assistant, RetrievalQa, VectorIndex};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// LLM provider (Ollama, etc.)
    pub provider: Arc<dyn LlmProvider>,

    /// Vector index backing document search and the QA chain
    pub index: Arc<dyn VectorIndex>,

    /// Conversational assistant (agent loop + language guard)
    pub assistant: Arc<Assistant>,

    /// Single-shot retrieval-QA chain
    pub qa: Arc<RetrievalQa>,

    /// Per-session memory and turn locks
    pub sessions: Arc<SessionManager>,
}
