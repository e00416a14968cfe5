//! Chat gateway: one remote call per turn, plus the local fallback responder.
//!
//! The gateway holds no conversation state. Failures are normalized into [`GatewayError`];
//! callers may log the [`FailureKind`] but treat every failure the same way.

mod fallback;
mod http;
mod protocol;

pub use fallback::{classify, local_reply, FallbackTopic};
pub use http::HttpChatGateway;
pub use protocol::{ChatRequest, ChatResponse, ErrorBody, HealthStatus, WireMessage};

use crate::conversation::Message;
use async_trait::async_trait;

/// Reply extracted from a successful remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub response: String,
    /// Server-stamped time, passed through as sent.
    pub timestamp: String,
}

impl From<ChatResponse> for ChatReply {
    fn from(r: ChatResponse) -> Self {
        Self {
            response: r.response,
            timestamp: r.timestamp,
        }
    }
}

/// Which side a failure came from. Diagnostic only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NetworkFailure,
    ServerFailure,
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// No HTTP response was received (connect, DNS, transport timeout).
    #[error("chat request failed: {detail}")]
    Network { detail: String },
    /// A response arrived but was not a usable success (non-2xx or malformed body).
    #[error("chat endpoint error (status {}): {detail}", status_label(.status))]
    Server { status: Option<u16>, detail: String },
}

fn status_label(status: &Option<u16>) -> String {
    status.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string())
}

impl GatewayError {
    pub fn kind(&self) -> FailureKind {
        match self {
            GatewayError::Network { .. } => FailureKind::NetworkFailure,
            GatewayError::Server { .. } => FailureKind::ServerFailure,
        }
    }
}

/// Sends one conversation turn to the chat endpoint.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Send `latest` with the full `history`. Exactly one outbound call, no retry.
    async fn send_turn(&self, latest: &str, history: &[Message]) -> Result<ChatReply, GatewayError>;

    /// Canned reply used when `send_turn` fails.
    fn local_fallback(&self, text: &str) -> String {
        local_reply(text)
    }
}

#[async_trait]
impl<G: ChatGateway + ?Sized> ChatGateway for std::sync::Arc<G> {
    async fn send_turn(&self, latest: &str, history: &[Message]) -> Result<ChatReply, GatewayError> {
        (**self).send_turn(latest, history).await
    }

    fn local_fallback(&self, text: &str) -> String {
        (**self).local_fallback(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_variant() {
        let n = GatewayError::Network {
            detail: "connection refused".to_string(),
        };
        let s = GatewayError::Server {
            status: Some(500),
            detail: "boom".to_string(),
        };
        assert_eq!(n.kind(), FailureKind::NetworkFailure);
        assert_eq!(s.kind(), FailureKind::ServerFailure);
        assert_eq!(s.to_string(), "chat endpoint error (status 500): boom");
    }
}
