//! Encyclopedia Tool
//!
//! Delegates to the Wikipedia client; a failure from the underlying
//! service propagates as a tool-level error and is converted to
//! observation text at the registry boundary.

use agent_core::{Result as CoreResult, Tool, error::AgentError};
use async_trait::async_trait;

use crate::wikipedia::WikipediaClient;

/// Tool for general-knowledge lookups on Spanish Wikipedia
pub struct EncyclopediaTool {
    client: WikipediaClient,
}

impl EncyclopediaTool {
    pub fn new(client: WikipediaClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for EncyclopediaTool {
    fn name(&self) -> &str {
        "Buscar_en_Wikipedia"
    }

    fn description(&self) -> &str {
        "Usa esta herramienta para buscar información general en Wikipedia en español. \
         Útil para consultas sobre personas, lugares, conceptos, historia, etc. \
         Entrada: término o pregunta a buscar."
    }

    async fn call(&self, input: &str) -> CoreResult<String> {
        self.client
            .search_summaries(input)
            .await
            .map_err(|e| AgentError::ToolExecution(e.to_string()))
    }
}
