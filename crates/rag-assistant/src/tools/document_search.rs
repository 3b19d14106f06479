//! Document Search Tool
//!
//! Similarity lookup against the externally-owned vector index, formatted
//! as a context blob with trailing deduplicated citations so the
//! reasoning layer can quote sources in its final answer.

use std::sync::Arc;

use agent_core::{Result as CoreResult, Tool, error::AgentError};
use async_trait::async_trait;

use crate::retrieval::VectorIndex;

/// Fixed number of chunks retrieved per query
const TOP_K: usize = 4;

/// Returned verbatim when the index has nothing relevant
pub const NO_RESULTS: &str = "No se encontró información relevante en los documentos.";

/// Tool for searching the indexed PDF collection
pub struct DocumentSearchTool {
    index: Arc<dyn VectorIndex>,
}

impl DocumentSearchTool {
    pub fn new(index: Arc<dyn VectorIndex>) -> Self {
        Self { index }
    }
}

#[async_trait]
impl Tool for DocumentSearchTool {
    fn name(&self) -> &str {
        "Buscar_en_PDFs"
    }

    fn description(&self) -> &str {
        "Usa esta herramienta para buscar información dentro de documentos PDF indexados. \
         Siempre úsala cuando te pregunten sobre el contenido de documentos."
    }

    async fn call(&self, input: &str) -> CoreResult<String> {
        let hits = self
            .index
            .query(input, TOP_K)
            .await
            .map_err(|e| AgentError::ToolExecution(e.to_string()))?;

        if hits.is_empty() {
            return Ok(NO_RESULTS.into());
        }

        let mut context = String::new();
        let mut sources: Vec<String> = Vec::new();

        for hit in &hits {
            let file = hit.source_file.as_deref().unwrap_or("Desconocido");
            let page = hit
                .page
                .map_or_else(|| "N/A".to_string(), |p| p.to_string());

            let citation = format!("{file} (pág. {page})");
            if !sources.contains(&citation) {
                sources.push(citation);
            }

            context.push_str(&hit.content);
            context.push('\n');
        }

        Ok(format!(
            "Información encontrada en los documentos:\n\n{context}\nFuentes: {}\n",
            sources.join(", ")
        ))
    }
}
