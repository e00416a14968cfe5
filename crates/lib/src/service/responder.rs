//! Answer generation for the reference chat service.

use crate::config::{self, AssistantConfig};
use crate::conversation::Sender;
use crate::gateway::WireMessage;
use crate::llm::{ChatMessage, OllamaClient, OllamaError};
use async_trait::async_trait;

const SYSTEM_PROMPT: &str = "Tu es un assistant expert de la CAN 2025 (Coupe d'Afrique des Nations, Maroc). \
Réponds en français, de façon précise et concise. \
Si tu ne connais pas la réponse, dis simplement que tu ne sais pas. \
Sois précis sur les buteurs, les minutes de jeu et les clubs des joueurs.";

#[derive(Debug, thiserror::Error)]
pub enum ResponderError {
    #[error(transparent)]
    Ollama(#[from] OllamaError),
    #[error("model returned an empty answer")]
    Empty,
}

/// Produces the bot answer for one question.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, question: &str, history: &[WireMessage]) -> Result<String, ResponderError>;

    /// True when the backing model is available. Checked once at startup.
    async fn is_ready(&self) -> bool {
        true
    }
}

/// Responder backed by an Ollama chat model.
pub struct OllamaResponder {
    client: OllamaClient,
    model: String,
}

impl OllamaResponder {
    pub fn new(client: OllamaClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn from_config(assistant: &AssistantConfig) -> Self {
        Self::new(
            OllamaClient::new(Some(config::resolve_ollama_base_url(assistant))),
            config::resolve_model(assistant),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Responder for OllamaResponder {
    async fn respond(&self, question: &str, history: &[WireMessage]) -> Result<String, ResponderError> {
        let messages = build_messages(question, history);
        log::debug!("responder: {} message(s) to {}", messages.len(), self.model);
        let completion = self.client.chat(&self.model, messages).await?;
        let answer = completion.content().trim();
        if answer.is_empty() {
            return Err(ResponderError::Empty);
        }
        Ok(answer.to_string())
    }

    async fn is_ready(&self) -> bool {
        match self.client.list_models().await {
            Ok(models) => {
                let found = models.iter().any(|m| m.name == self.model);
                if !found {
                    log::warn!(
                        "responder: model {} not found ({} model(s) available)",
                        self.model,
                        models.len()
                    );
                }
                found
            }
            Err(e) => {
                log::warn!("responder: ollama unreachable: {}", e);
                false
            }
        }
    }
}

/// System prompt, prior history, then the question. A trailing history entry that is the
/// question itself (clients send history including the new message) is not repeated.
pub fn build_messages(question: &str, history: &[WireMessage]) -> Vec<ChatMessage> {
    let mut prior = history;
    if let Some(last) = history.last() {
        if last.sender == Sender::User && last.message.trim() == question.trim() {
            prior = &history[..history.len() - 1];
        }
    }
    let mut messages = Vec::with_capacity(prior.len() + 2);
    messages.push(ChatMessage::system(SYSTEM_PROMPT));
    for m in prior {
        messages.push(match m.sender {
            Sender::User => ChatMessage::user(m.message.clone()),
            Sender::Bot => ChatMessage::assistant(m.message.clone()),
        });
    }
    messages.push(ChatMessage::user(question));
    messages
}
