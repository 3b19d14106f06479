//! In-Memory Vector Index
//!
//! For testing and demo purposes. Ranks stored chunks by naive keyword
//! overlap instead of real vector similarity.

use async_trait::async_trait;

use super::{DocumentHit, VectorIndex};
use crate::error::Result;

/// In-memory keyword index with static content
#[derive(Default)]
pub struct MemoryIndex {
    documents: Vec<DocumentHit>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a chunk to the index
    pub fn insert(
        &mut self,
        content: impl Into<String>,
        source_file: impl Into<String>,
        page: i64,
    ) {
        self.documents.push(DocumentHit {
            content: content.into(),
            source_file: Some(source_file.into()),
            page: Some(page),
        });
    }

    /// Overlap score between a query and a chunk
    fn score(query_terms: &[String], content: &str) -> usize {
        let content = content.to_lowercase();
        query_terms
            .iter()
            .filter(|term| content.contains(term.as_str()))
            .count()
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn query(&self, text: &str, k: usize) -> Result<Vec<DocumentHit>> {
        let terms: Vec<String> = text
            .to_lowercase()
            .split_whitespace()
            .filter(|t| t.chars().count() > 3)
            .map(String::from)
            .collect();

        let mut scored: Vec<(usize, &DocumentHit)> = self
            .documents
            .iter()
            .map(|doc| (Self::score(&terms, &doc.content), doc))
            .filter(|(score, _)| *score > 0)
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0));

        Ok(scored.into_iter().take(k).map(|(_, doc)| doc.clone()).collect())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "MemoryIndex"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_keyword_ranking() {
        let mut index = MemoryIndex::new();
        index.insert("El contrato establece un plazo de garantía.", "contrato.pdf", 3);
        index.insert("Receta de gazpacho andaluz.", "recetas.pdf", 1);

        let hits = index.query("plazo de garantía del contrato", 4).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].source_file.as_deref(), Some("contrato.pdf"));
    }

    #[tokio::test]
    async fn test_no_match_returns_empty() {
        let mut index = MemoryIndex::new();
        index.insert("El contrato establece un plazo.", "contrato.pdf", 3);

        let hits = index.query("astronomía planetaria", 4).await.unwrap();
        assert!(hits.is_empty());
    }
}
