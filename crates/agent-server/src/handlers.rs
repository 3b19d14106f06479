//! HTTP/WebSocket Handlers

use axum::{
    Json,
    extract::{
        Path, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    http::StatusCode,
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};

use agent_core::{AgentTurn, LlmProvider, SessionId, provider::ModelInfo};
use rag_assistant::{QaAnswer, VectorIndex};

use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub ollama_connected: bool,
    pub index_connected: bool,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub answer: String,
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
pub struct QaRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let ollama_connected = state.provider.health_check().await.unwrap_or(false);
    let index_connected = state.index.health_check().await;

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        ollama_connected,
        index_connected,
    })
}

/// List models available on the provider
pub async fn list_models(
    State(state): State<AppState>,
) -> Result<Json<Vec<ModelInfo>>, (StatusCode, Json<ErrorResponse>)> {
    let models = state.provider.list_models().await.map_err(|e| {
        tracing::error!("Model listing error: {}", e);
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: e.user_message(),
                code: "PROVIDER_UNAVAILABLE".into(),
            }),
        )
    })?;

    Ok(Json(models))
}

/// Main conversational endpoint: one agent turn per request
///
/// The session lock is held for the whole turn, so a session never runs
/// two turns concurrently. Error turns are recorded in the history with
/// the error string as their answer.
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, Json<ErrorResponse>)> {
    let message = payload.message.trim().to_string();
    if message.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "La pregunta no puede estar vacía.".into(),
                code: "EMPTY_MESSAGE".into(),
            }),
        ));
    }

    let session_id = payload
        .session_id
        .map(SessionId::from_string)
        .unwrap_or_default();

    let session = state.sessions.get_or_create(&session_id);
    let mut session = session.lock().await;

    let answer = state.assistant.answer(&mut session.memory, &message).await;
    session.record_turn(&message, &answer);

    Ok(Json(ChatResponse {
        answer,
        session_id: session_id.to_string(),
    }))
}

/// Single-shot retrieval QA with source citations
pub async fn qa_handler(
    State(state): State<AppState>,
    Json(payload): Json<QaRequest>,
) -> Result<Json<QaAnswer>, (StatusCode, Json<ErrorResponse>)> {
    let result = state.qa.answer(&payload.question).await.map_err(|e| {
        tracing::error!("QA chain error: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Error al consultar los documentos.".into(),
                code: "QA_ERROR".into(),
            }),
        )
    })?;

    Ok(Json(result))
}

/// Replay a session's display history
pub async fn get_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<AgentTurn>>, (StatusCode, Json<ErrorResponse>)> {
    let id = SessionId::from_string(&session_id);
    match state.sessions.get(&id) {
        Some(session) => Ok(Json(session.lock().await.history.clone())),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Sesión '{}' no encontrada.", session_id),
                code: "SESSION_NOT_FOUND".into(),
            }),
        )),
    }
}

/// Explicit user reset of a session (history and memory)
pub async fn clear_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> StatusCode {
    let id = SessionId::from_string(&session_id);
    match state.sessions.get(&id) {
        Some(session) => {
            session.lock().await.reset();
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}

/// WebSocket streaming of the QA chain
pub async fn chat_stream_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_stream(socket, state))
}

async fn handle_stream(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Err(e) => {
                tracing::error!("WebSocket error: {}", e);
                break;
            }
            _ => continue,
        };

        // Parse request
        let request: QaRequest = match serde_json::from_str(&msg) {
            Ok(r) => r,
            Err(e) => {
                let error = serde_json::json!({"type": "error", "error": e.to_string()});
                let _ = sender.send(Message::Text(error.to_string().into())).await;
                continue;
            }
        };

        // Stream response; sources go first so the client can render them
        match state.qa.stream(&request.question).await {
            Ok((mut stream, sources)) => {
                let header = serde_json::json!({"type": "sources", "sources": sources});
                if sender
                    .send(Message::Text(header.to_string().into()))
                    .await
                    .is_err()
                {
                    break;
                }

                while let Some(result) = stream.next().await {
                    match result {
                        Ok(chunk) => {
                            let response = serde_json::json!({
                                "type": "chunk",
                                "content": chunk.delta,
                                "done": chunk.done,
                            });
                            if sender
                                .send(Message::Text(response.to_string().into()))
                                .await
                                .is_err()
                            {
                                break;
                            }
                        }
                        Err(e) => {
                            let error =
                                serde_json::json!({"type": "error", "error": e.to_string()});
                            let _ = sender.send(Message::Text(error.to_string().into())).await;
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                let error = serde_json::json!({"type": "error", "error": e.to_string()});
                let _ = sender.send(Message::Text(error.to_string().into())).await;
            }
        }
    }
}
