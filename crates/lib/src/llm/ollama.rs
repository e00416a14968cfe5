//! Ollama API client (http://127.0.0.1:11434 by default).
//! Non-streaming chat only.

use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434";

/// Client for Ollama HTTP API.
#[derive(Clone)]
pub struct OllamaClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, thiserror::Error)]
pub enum OllamaError {
    #[error("ollama request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("ollama api error: {0}")]
    Api(String),
}

impl OllamaClient {
    pub fn new(base_url: Option<String>) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    /// GET /api/tags — list available models.
    pub async fn list_models(&self) -> Result<Vec<OllamaModel>, OllamaError> {
        let url = format!("{}/api/tags", self.base_url);
        let res = self.client.get(&url).send().await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(OllamaError::Api(format!("{} {}", status, body)));
        }
        let data: TagsResponse = res.json().await?;
        Ok(data.models.unwrap_or_default())
    }

    /// POST /api/chat with stream: false.
    pub async fn chat(
        &self,
        model: &str,
        messages: Vec<ChatMessage>,
    ) -> Result<ChatCompletion, OllamaError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = ChatRequest {
            model: model.to_string(),
            messages,
            stream: false,
        };
        let res = self.client.post(&url).json(&body).send().await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(OllamaError::Api(format!("{} {}", status, body)));
        }
        let data: ChatCompletion = res.json().await?;
        Ok(data)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaModel {
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    models: Option<Vec<OllamaModel>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletion {
    pub message: Option<ChatMessage>,
}

impl ChatCompletion {
    /// Text content of the assistant message, if any.
    pub fn content(&self) -> &str {
        self.message
            .as_ref()
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_is_non_streaming() {
        let body = ChatRequest {
            model: "llama3.2:latest".to_string(),
            messages: vec![ChatMessage::user("salut")],
            stream: false,
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["stream"], false);
        assert_eq!(v["messages"][0]["role"], "user");
    }

    #[test]
    fn completion_content_defaults_to_empty() {
        let c: ChatCompletion = serde_json::from_str(r#"{"done":true}"#).unwrap();
        assert_eq!(c.content(), "");
        let c: ChatCompletion =
            serde_json::from_str(r#"{"message":{"role":"assistant","content":"ok"},"done":true}"#)
                .unwrap();
        assert_eq!(c.content(), "ok");
    }
}
