//! # rag-assistant
//!
//! Spanish-language RAG assistant over an externally-indexed PDF
//! collection, with two additional tools (encyclopedia, weather) and a
//! post-hoc language guard.
//!
//! ## Entry points
//!
//! - [`Assistant`] — the conversational agent: one tool-using turn per
//!   question against a caller-owned conversation memory, followed by the
//!   [`guard::LanguageGuard`]. Every call yields a displayable string.
//! - [`RetrievalQa`] — the single-shot answer-from-context chain, no
//!   tools and no memory.
//!
//! ## Tool set
//!
//! The registry is closed and built once at session start:
//!
//! - `Buscar_en_PDFs` — similarity search over the vector index
//! - `Buscar_en_Wikipedia` — bounded summaries from Spanish Wikipedia
//! - `Consultar_Clima` — two-step OpenWeatherMap lookup

pub mod assistant;
pub mod error;
pub mod guard;
pub mod qa;
pub mod retrieval;
pub mod tools;
pub mod weather;
pub mod wikipedia;

#[cfg(test)]
pub(crate) mod testing;

pub use assistant::Assistant;
pub use error::{AssistantError, Result};
pub use guard::LanguageGuard;
pub use qa::{QaAnswer, RetrievalQa, SourceRef};
pub use retrieval::{ChromaConfig, ChromaIndex, DocumentHit, MemoryIndex, VectorIndex};
pub use weather::{WeatherClient, WeatherConfig, WeatherError};
pub use wikipedia::WikipediaClient;

/// Re-export tools for easy registration
pub use tools::{DocumentSearchTool, EncyclopediaTool, WeatherTool};

/// System prompt for the conversational assistant
pub const ASSISTANT_PROMPT: &str = r#"Eres un asistente útil que SIEMPRE responde en ESPAÑOL.

INSTRUCCIONES IMPORTANTES:
1. NUNCA respondas en inglés, solo en español
2. Cuando el usuario pregunte sobre documentos, DEBES usar la herramienta "Buscar_en_PDFs"
3. Para información general, usa "Buscar_en_Wikipedia"
4. Para el clima, usa "Consultar_Clima"
5. Si la herramienta devuelve información, basa tu respuesta en esa información
6. Si no hay información en los documentos, dilo claramente
7. Todas tus respuestas deben ser en español, sin excepción"#;
