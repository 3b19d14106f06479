//! Assistant Facade
//!
//! The single operation the presentation layer consumes: one agent turn
//! followed by the language guard. This is the outermost error boundary;
//! whatever escapes the reasoning loop is converted to the user-visible
//! error string here, so every call yields a displayable answer.

use agent_core::{Agent, ConversationMemory};

use crate::guard::LanguageGuard;

/// Conversational assistant: agent loop plus language guard
pub struct Assistant {
    agent: Agent,
    guard: LanguageGuard,
}

impl Assistant {
    pub fn new(agent: Agent, guard: LanguageGuard) -> Self {
        Self { agent, guard }
    }

    /// Answer one user question within the given conversation memory
    ///
    /// Never fails: turn-level errors come back as the error string the
    /// presentation layer records in place of an answer.
    pub async fn answer(&self, memory: &mut ConversationMemory, question: &str) -> String {
        let raw = match self.agent.run(memory, question).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!(error = %e, "agent turn failed");
                return format!("Error al procesar la consulta: {}", e.user_message());
            }
        };

        self.guard.enforce(&raw).await
    }

    /// Access the underlying agent (e.g. for tool introspection)
    pub fn agent(&self) -> &Agent {
        &self.agent
    }
}
