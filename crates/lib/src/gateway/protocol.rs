//! Chat endpoint wire types, shared by the client gateway and the reference service.

use crate::conversation::{Message, Sender};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// POST body: `{ "message", "conversationHistory"? }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_history: Option<Vec<WireMessage>>,
}

/// History entry: `{ "id", "message", "sender", "timestamp" }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMessage {
    pub id: u64,
    pub message: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl From<&Message> for WireMessage {
    fn from(m: &Message) -> Self {
        Self {
            id: m.id(),
            message: m.text().to_string(),
            sender: m.sender(),
            timestamp: m.timestamp(),
        }
    }
}

impl ChatRequest {
    pub fn new(message: impl Into<String>, history: &[Message]) -> Self {
        let conversation_history = if history.is_empty() {
            None
        } else {
            Some(history.iter().map(WireMessage::from).collect())
        };
        Self {
            message: message.into(),
            conversation_history,
        }
    }
}

/// Success body: `{ "response", "timestamp" }`. Extra fields (e.g. `status`) are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub timestamp: String,
}

/// `GET /api/health` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
    pub chatbot_loaded: bool,
}

/// Error body returned by the reference service; clients never parse it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            path: None,
        }
    }
}
