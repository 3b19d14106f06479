//! # agent-core
//!
//! Core agent logic with provider-agnostic LLM abstraction, a closed tool
//! registry and a bounded ReAct reasoning loop.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Agent                                │
//! │  ┌─────────────┐  ┌──────────────┐  ┌─────────────────────┐  │
//! │  │  Reasoning  │  │     Tool     │  │    LlmProvider      │  │
//! │  │    Loop     │──│   Registry   │──│    (Strategy)       │  │
//! │  └──────┬──────┘  └──────────────┘  └─────────────────────┘  │
//! │         │                                                    │
//! │  ConversationMemory (caller-owned, one exchange per turn)    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait enables swapping between Ollama, OpenAI,
//! Anthropic, or any other provider without changing agent logic. The
//! provider is constructed once and passed explicitly to every consumer;
//! there is no process-global model handle.

pub mod error;
pub mod memory;
pub mod message;
pub mod provider;
pub mod reasoning;
pub mod session;
pub mod tool;

pub use error::{AgentError, Result};
pub use memory::{ConversationMemory, Exchange};
pub use message::{Message, Role};
pub use provider::{EmbeddingProvider, LlmProvider};
pub use reasoning::{Agent, AgentBuilder, AgentConfig};
pub use session::{AgentTurn, Session, SessionId, SessionManager};
pub use tool::{Tool, ToolRegistry};
