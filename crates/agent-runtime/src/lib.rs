//! # agent-runtime
//!
//! Runtime providers for the RAG assistant.
//!
//! ## Providers
//!
//! - **Ollama** (default): local chat and embedding inference via Ollama
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::ollama::OllamaProvider;
//!
//! let provider = OllamaProvider::new("http://localhost", 11434);
//! let agent = AgentBuilder::new()
//!     .provider(Arc::new(provider))
//!     .build()?;
//! ```

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "ollama")]
pub use ollama::{OllamaConfig, OllamaProvider};

// Re-export core types for convenience
pub use agent_core::{
    Agent, AgentError, ConversationMemory, EmbeddingProvider, LlmProvider, Message, Result, Role,
    Session, Tool, ToolRegistry,
};
