//! Chroma Vector Index Client
//!
//! Talks to a Chroma server over its REST API. Query embeddings are
//! computed client-side through the configured `EmbeddingProvider`, so the
//! index itself never sees raw model traffic.

use std::sync::Arc;
use std::time::Duration;

use agent_core::provider::EmbeddingProvider;
use async_trait::async_trait;
use serde_json::Value;

use super::{DocumentHit, VectorIndex};
use crate::error::{AssistantError, Result};

/// Chroma connection configuration
#[derive(Clone, Debug)]
pub struct ChromaConfig {
    /// Chroma server base URL
    pub url: String,

    /// Collection name holding the indexed documents
    pub collection: String,

    /// Embedding model used for query vectors
    pub embedding_model: String,
}

impl Default for ChromaConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8000".into(),
            collection: "langchain".into(),
            embedding_model: "embeddinggemma:300m".into(),
        }
    }
}

impl ChromaConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            url: std::env::var("CHROMA_URL").unwrap_or(defaults.url),
            collection: std::env::var("CHROMA_COLLECTION").unwrap_or(defaults.collection),
            embedding_model: std::env::var("EMBEDDING_MODEL").unwrap_or(defaults.embedding_model),
        }
    }
}

/// Chroma REST client bound to one collection
pub struct ChromaIndex {
    http: reqwest::Client,
    base_url: String,
    collection_id: String,
    embedder: Arc<dyn EmbeddingProvider>,
    embedding_model: String,
}

impl ChromaIndex {
    /// Connect and resolve the collection id by name
    pub async fn connect(
        config: ChromaConfig,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        let url = format!("{}/api/v1/collections/{}", config.url, config.collection);
        let response = http.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(AssistantError::Index(format!(
                "colección '{}' no disponible (HTTP {})",
                config.collection,
                response.status().as_u16()
            )));
        }

        let body: Value = response.json().await?;
        let collection_id = body["id"]
            .as_str()
            .ok_or_else(|| AssistantError::Index("respuesta sin id de colección".into()))?
            .to_string();

        tracing::info!(
            collection = %config.collection,
            id = %collection_id,
            "connected to Chroma collection"
        );

        Ok(Self {
            http,
            base_url: config.url,
            collection_id,
            embedder,
            embedding_model: config.embedding_model,
        })
    }
}

#[async_trait]
impl VectorIndex for ChromaIndex {
    async fn query(&self, text: &str, k: usize) -> Result<Vec<DocumentHit>> {
        let embedding = self
            .embedder
            .embed(&self.embedding_model, text)
            .await
            .map_err(|e| AssistantError::Embedding(e.to_string()))?;

        let url = format!(
            "{}/api/v1/collections/{}/query",
            self.base_url, self.collection_id
        );
        let payload = serde_json::json!({
            "query_embeddings": [embedding],
            "n_results": k,
            "include": ["documents", "metadatas"],
        });

        let response = self.http.post(&url).json(&payload).send().await?;
        if !response.status().is_success() {
            return Err(AssistantError::Index(format!(
                "consulta al índice falló (HTTP {})",
                response.status().as_u16()
            )));
        }

        let body: Value = response.json().await?;
        let documents = body["documents"][0].as_array().cloned().unwrap_or_default();
        let metadatas = body["metadatas"][0].as_array().cloned().unwrap_or_default();

        let hits = documents
            .iter()
            .enumerate()
            .filter_map(|(i, doc)| {
                let content = doc.as_str()?.to_string();
                let metadata = metadatas.get(i).cloned().unwrap_or(Value::Null);
                Some(DocumentHit {
                    content,
                    source_file: metadata["source_file"].as_str().map(String::from),
                    page: metadata["page"].as_i64(),
                })
            })
            .collect();

        Ok(hits)
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/api/v1/heartbeat", self.base_url);
        match self.http.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn name(&self) -> &str {
        "Chroma"
    }
}
