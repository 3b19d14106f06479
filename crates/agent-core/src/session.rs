//! Session Management
//!
//! One session owns one `ConversationMemory`, one display history, and is
//! driven by at most one in-flight turn at a time. The manager hands out
//! each session behind a `tokio::sync::Mutex`; holding the lock for the
//! duration of a turn serializes memory mutation and scratchpad
//! accumulation, which are not designed for concurrent access. Sessions
//! live for the process lifetime only; persistence is out of scope.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::memory::ConversationMemory;

/// Unique session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The externally visible result of one completed turn
///
/// Error turns are recorded too, with the user-visible error string as
/// their answer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentTurn {
    pub question: String,
    pub answer: String,
}

/// A complete agent session
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier
    pub id: SessionId,

    /// Agent-owned conversation memory (replayed each reasoning step)
    pub memory: ConversationMemory,

    /// Presentation-owned display history, error turns included
    pub history: Vec<AgentTurn>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last activity timestamp
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a new session
    pub fn new() -> Self {
        Self::with_id(SessionId::new())
    }

    /// Create with specific ID
    pub fn with_id(id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            id,
            memory: ConversationMemory::new(),
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Update the activity timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Append a completed (or failed) turn to the display history
    pub fn record_turn(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.history.push(AgentTurn {
            question: question.into(),
            answer: answer.into(),
        });
        self.touch();
    }

    /// Explicit user reset: clears memory and display history
    pub fn reset(&mut self) {
        self.memory.clear();
        self.history.clear();
        self.touch();
    }

    /// Title derived from the first question
    pub fn title(&self) -> String {
        self.history
            .first()
            .map(|turn| {
                let preview: String = turn.question.chars().take(50).collect();
                if turn.question.chars().count() > 50 {
                    format!("{}...", preview)
                } else {
                    preview
                }
            })
            .unwrap_or_else(|| format!("Sesión {}", &self.id.as_str()[..8.min(self.id.as_str().len())]))
    }

    /// Number of display turns
    pub fn turn_count(&self) -> usize {
        self.history.len()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Hands out sessions behind a per-session turn lock
///
/// The inner `tokio::sync::Mutex` enforces at most one active turn per
/// session; the manager map itself is read-mostly.
pub struct SessionManager {
    sessions: RwLock<HashMap<SessionId, Arc<tokio::sync::Mutex<Session>>>>,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Get an existing session
    pub fn get(&self, id: &SessionId) -> Option<Arc<tokio::sync::Mutex<Session>>> {
        self.sessions.read().unwrap().get(id).cloned()
    }

    /// Get an existing session or create it
    pub fn get_or_create(&self, id: &SessionId) -> Arc<tokio::sync::Mutex<Session>> {
        if let Some(session) = self.get(id) {
            return session;
        }

        let mut sessions = self.sessions.write().unwrap();
        sessions
            .entry(id.clone())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(Session::with_id(id.clone()))))
            .clone()
    }

    /// Drop a session entirely
    pub fn remove(&self, id: &SessionId) -> bool {
        self.sessions.write().unwrap().remove(id).is_some()
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.sessions.read().unwrap().len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.sessions.read().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_record_and_reset() {
        let mut session = Session::new();
        session.memory.record("pregunta", "respuesta");
        session.record_turn("pregunta", "respuesta");

        assert_eq!(session.turn_count(), 1);
        assert_eq!(session.memory.len(), 1);

        session.reset();
        assert_eq!(session.turn_count(), 0);
        assert!(session.memory.is_empty());
    }

    #[tokio::test]
    async fn test_manager_returns_same_session() {
        let manager = SessionManager::new();
        let id = SessionId::from_string("abc");

        let a = manager.get_or_create(&id);
        let b = manager.get_or_create(&id);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(manager.len(), 1);

        a.lock().await.record_turn("q", "a");
        assert_eq!(b.lock().await.turn_count(), 1);
    }

    #[test]
    fn test_title_from_first_question() {
        let mut session = Session::new();
        session.record_turn("¿Cómo está el clima en Madrid?", "Soleado.");
        assert_eq!(session.title(), "¿Cómo está el clima en Madrid?");
    }
}
