//! Vector Index Integration
//!
//! Abstraction over an externally-owned, externally-populated similarity
//! index. The assistant only reads: `(query, k)` in, scored document hits
//! out. Index population and persistence are not this crate's concern.

mod chroma;
mod memory;

pub use chroma::{ChromaConfig, ChromaIndex};
pub use memory::MemoryIndex;

use async_trait::async_trait;

use crate::error::Result;

/// One similarity hit from the index
#[derive(Clone, Debug)]
pub struct DocumentHit {
    /// Chunk text content
    pub content: String,

    /// Originating file, if recorded at indexing time
    pub source_file: Option<String>,

    /// Page number within the source file
    pub page: Option<i64>,
}

/// Vector index client trait (Strategy pattern)
///
/// Implement this for each backend: Chroma, Qdrant, an in-memory index
/// for tests, etc.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Run a similarity lookup, best matches first
    async fn query(&self, text: &str, k: usize) -> Result<Vec<DocumentHit>>;

    /// Check if the index is reachable
    async fn health_check(&self) -> bool;

    /// Backend name
    fn name(&self) -> &str;
}
