//! Retrieval-QA Chain
//!
//! Single-shot answer-from-context chain: retrieve the top chunks for a
//! question, render them into a context-only prompt, run one completion.
//! No tools, no memory; the conversational agent is the other entry point.

use std::sync::Arc;

use agent_core::{
    Message,
    provider::{CompletionStream, GenerationOptions, LlmProvider},
};
use serde::Serialize;

use crate::error::{AssistantError, Result};
use crate::retrieval::VectorIndex;

/// Default number of chunks stuffed into the context
const DEFAULT_TOP_K: usize = 4;

/// Citation attached to a QA answer
#[derive(Clone, Debug, Serialize)]
pub struct SourceRef {
    pub file: String,
    pub page: Option<i64>,
}

/// Result of one QA invocation
#[derive(Clone, Debug, Serialize)]
pub struct QaAnswer {
    pub answer: String,
    pub sources: Vec<SourceRef>,
}

/// Answer-from-context chain over the vector index
pub struct RetrievalQa {
    index: Arc<dyn VectorIndex>,
    provider: Arc<dyn LlmProvider>,
    options: GenerationOptions,
    top_k: usize,
}

impl RetrievalQa {
    pub fn new(
        index: Arc<dyn VectorIndex>,
        provider: Arc<dyn LlmProvider>,
        options: GenerationOptions,
    ) -> Self {
        Self {
            index,
            provider,
            options,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Answer a question from indexed context only
    pub async fn answer(&self, question: &str) -> Result<QaAnswer> {
        let (prompt, sources) = self.build_prompt(question).await?;

        let completion = self
            .provider
            .complete(&[Message::user(prompt)], &self.options)
            .await
            .map_err(|e| AssistantError::Chain(e.to_string()))?;

        Ok(QaAnswer {
            answer: completion.content.trim().to_string(),
            sources,
        })
    }

    /// Streaming variant: chunks of the answer plus the resolved sources
    pub async fn stream(&self, question: &str) -> Result<(CompletionStream, Vec<SourceRef>)> {
        let (prompt, sources) = self.build_prompt(question).await?;

        let stream = self
            .provider
            .complete_stream(&[Message::user(prompt)], &self.options)
            .await
            .map_err(|e| AssistantError::Chain(e.to_string()))?;

        Ok((stream, sources))
    }

    /// Retrieve context and render the chain prompt
    async fn build_prompt(&self, question: &str) -> Result<(String, Vec<SourceRef>)> {
        let hits = self.index.query(question, self.top_k).await?;

        let context = hits
            .iter()
            .map(|hit| hit.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let sources = hits
            .iter()
            .map(|hit| SourceRef {
                file: hit
                    .source_file
                    .clone()
                    .unwrap_or_else(|| "Desconocido".into()),
                page: hit.page,
            })
            .collect();

        let prompt = format!(
            "Eres un asistente que responde usando EXCLUSIVAMENTE el contexto proporcionado.\n\
             Si la respuesta no está en el contexto, di claramente que no aparece en los documentos.\n\n\
             ---------------- CONTEXTO ----------------\n\
             {context}\n\
             -----------------------------------------\n\n\
             Pregunta del usuario: {question}\n\n\
             Respuesta en español, clara y concisa:"
        );

        Ok((prompt, sources))
    }
}
