//! Error Types

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent error types
#[derive(Error, Debug)]
pub enum AgentError {
    /// LLM provider error
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider unavailable or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Tool not found in registry
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool execution failed
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// Parse error (e.g., tool directive parsing)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Session error
    #[error("Session error: {0}")]
    Session(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl AgentError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AgentError::ProviderUnavailable(_) | AgentError::Io(_)
        )
    }

    /// Convert to a user-facing message (the assistant speaks Spanish)
    pub fn user_message(&self) -> String {
        match self {
            AgentError::Provider(msg) => {
                format!("El servicio de IA devolvió un error: {}", msg)
            }
            AgentError::ProviderUnavailable(_) => {
                "El servicio de IA no está disponible. Inténtalo de nuevo.".into()
            }
            AgentError::ToolNotFound(name) => {
                format!("La herramienta '{}' no está disponible.", name)
            }
            AgentError::ToolExecution(msg) => format!("Error de herramienta: {}", msg),
            AgentError::Session(_) => {
                "No se pudo recuperar la sesión. Inicia una conversación nueva.".into()
            }
            _ => "Ocurrió un error inesperado.".into(),
        }
    }
}

impl From<anyhow::Error> for AgentError {
    fn from(err: anyhow::Error) -> Self {
        AgentError::Other(err.to_string())
    }
}
