//! Conversation Memory
//!
//! Cross-turn state for one session: an append-only sequence of completed
//! (question, answer) exchanges. The memory is owned by the caller and
//! passed `&mut` into each agent invocation; the reasoning loop records
//! exactly one exchange per completed turn. It is cleared only by explicit
//! user action, never automatically.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::Message;

/// One completed question/answer exchange
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Exchange {
    /// User utterance
    pub question: String,

    /// Final assistant answer
    pub answer: String,

    /// When the turn completed
    pub timestamp: DateTime<Utc>,
}

/// Append-only conversation history, replayed in full on each reasoning step
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConversationMemory {
    exchanges: Vec<Exchange>,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed exchange
    pub fn record(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.exchanges.push(Exchange {
            question: question.into(),
            answer: answer.into(),
            timestamp: Utc::now(),
        });
    }

    /// All recorded exchanges, oldest first
    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    /// Replay the history as alternating user/assistant messages
    pub fn as_messages(&self) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.exchanges.len() * 2);
        for exchange in &self.exchanges {
            messages.push(Message::user(&exchange.question));
            messages.push(Message::assistant(&exchange.answer));
        }
        messages
    }

    /// Number of completed exchanges
    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    /// Explicit history reset
    pub fn clear(&mut self) {
        self.exchanges.clear();
    }
}
