//! Language Guard
//!
//! Deterministic post-filter over the agent's final answer. Detection is a
//! whitespace-delimited stoplist match on the lowercased text; only a
//! positive detection triggers the single translation call. The guard
//! never surfaces a failure: a broken translation call falls back to the
//! original answer.

use std::sync::Arc;

use agent_core::{
    Message,
    provider::{GenerationOptions, LlmProvider},
};

/// Common English function words that betray target-language leakage
const ENGLISH_STOPLIST: [&str; 17] = [
    "the", "and", "is", "are", "of", "to", "in", "that", "for", "with", "on", "at", "this",
    "from", "by", "was", "were",
];

/// Post-hoc Spanish enforcement over agent answers
pub struct LanguageGuard {
    provider: Arc<dyn LlmProvider>,
    options: GenerationOptions,
}

impl LanguageGuard {
    pub fn new(provider: Arc<dyn LlmProvider>, options: GenerationOptions) -> Self {
        Self { provider, options }
    }

    /// Whether any stoplist token appears as a whole word
    pub fn detects_english(text: &str) -> bool {
        let lowered = text.to_lowercase();
        lowered
            .split_whitespace()
            .any(|token| ENGLISH_STOPLIST.contains(&token))
    }

    /// Return the answer unchanged, or its one-shot translation
    pub async fn enforce(&self, answer: &str) -> String {
        if !Self::detects_english(answer) {
            return answer.to_string();
        }

        let prompt = format!(
            "Traduce el siguiente texto al español. Si ya está en español, déjalo igual.\n\
             IMPORTANTE: Tu respuesta debe contener SOLO el texto traducido, nada más.\n\n\
             Texto:\n{answer}\n\nTraducción al español:"
        );

        match self
            .provider
            .complete(&[Message::user(prompt)], &self.options)
            .await
        {
            Ok(completion) => completion.content.trim().to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "translation call failed, keeping original answer");
                answer.to_string()
            }
        }
    }
}
