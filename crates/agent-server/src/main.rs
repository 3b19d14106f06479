//! RAG Assistant HTTP Server
//!
//! Axum-based server exposing the conversational agent, the single-shot
//! retrieval-QA chain and per-session history over REST and WebSocket.

mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::{
    Agent, AgentConfig, LlmProvider, SessionManager, ToolRegistry, provider::GenerationOptions,
};
use agent_runtime::OllamaProvider;
use rag_assistant::{
    ASSISTANT_PROMPT, Assistant, ChromaConfig, ChromaIndex, DocumentSearchTool, EncyclopediaTool,
    LanguageGuard, MemoryIndex, RetrievalQa, VectorIndex, WeatherClient, WeatherConfig,
    WeatherTool, WikipediaClient,
};

use crate::handlers::{
    chat_handler, chat_stream_handler, clear_history, get_history, health_check, list_models,
    qa_handler,
};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    // Initialize LLM provider
    let provider = Arc::new(OllamaProvider::from_env());

    // Verify Ollama connection
    match provider.health_check().await {
        Ok(true) => {
            tracing::info!("✓ Connected to Ollama");
            if let Ok(models) = provider.list_models().await {
                for model in models {
                    tracing::info!("  Model: {}", model.id);
                }
            }
        }
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ Ollama not available - agent will fail");
            tracing::warn!("  Make sure Ollama is running: ollama serve");
        }
    }

    // Chat model configuration (low temperature keeps tool directives stable)
    let chat_model = std::env::var("CHAT_MODEL").unwrap_or_else(|_| "llama3".into());
    let generation = GenerationOptions {
        model: chat_model.clone(),
        temperature: 0.1,
        ..Default::default()
    };

    // Vector index: Chroma when reachable, otherwise an empty in-memory
    // index so document search degrades to "nothing found"
    let index: Arc<dyn VectorIndex> =
        match ChromaIndex::connect(ChromaConfig::from_env(), provider.clone()).await {
            Ok(index) => {
                tracing::info!("✓ Connected to Chroma");
                Arc::new(index)
            }
            Err(e) => {
                tracing::warn!("⚠ Chroma not available ({}) - using empty in-memory index", e);
                Arc::new(MemoryIndex::new())
            }
        };

    // Tool registry, fixed for the lifetime of the process
    let mut tools = ToolRegistry::new();
    tools.register(DocumentSearchTool::new(index.clone()));
    tools.register(EncyclopediaTool::new(WikipediaClient::new()?));

    match WeatherConfig::from_env() {
        Ok(config) => {
            tools.register(WeatherTool::new(Arc::new(WeatherClient::new(config)?)));
            tracing::info!("✓ OpenWeatherMap configured");
        }
        Err(_) => {
            tracing::warn!("⚠ OPENWEATHER_API_KEY not set - weather tool disabled");
        }
    }

    tracing::info!("Registered {} tools:", tools.len());
    for name in tools.names() {
        tracing::info!("  • {}", name);
    }

    // Assemble the assistant: agent loop + language guard
    let config = AgentConfig {
        system_prompt: ASSISTANT_PROMPT.into(),
        generation: generation.clone(),
        ..Default::default()
    };
    let agent = Agent::new(provider.clone(), Arc::new(tools), config);
    let guard = LanguageGuard::new(provider.clone(), generation.clone());
    let assistant = Arc::new(Assistant::new(agent, guard));

    // Single-shot QA chain over the same index and model
    let qa = Arc::new(RetrievalQa::new(index.clone(), provider.clone(), generation));

    // Build application state
    let state = AppState {
        provider,
        index,
        assistant,
        qa,
        sessions: Arc::new(SessionManager::new()),
    };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        // Health & info
        .route("/health", get(health_check))
        .route("/api/models", get(list_models))
        // Assistant API
        .route("/api/chat", post(chat_handler))
        .route("/api/chat/stream", get(chat_stream_handler))
        .route("/api/qa", post(qa_handler))
        // Session history
        .route(
            "/api/history/{session_id}",
            get(get_history).delete(clear_history),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 RAG assistant server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET    /health                    - Health check");
    tracing::info!("  GET    /api/models                - List available models");
    tracing::info!("  POST   /api/chat                  - Conversational agent turn");
    tracing::info!("  GET    /api/chat/stream           - WebSocket QA streaming");
    tracing::info!("  POST   /api/qa                    - Single-shot document QA");
    tracing::info!("  GET    /api/history/{{session_id}}  - Replay session history");
    tracing::info!("  DELETE /api/history/{{session_id}}  - Clear session history");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
