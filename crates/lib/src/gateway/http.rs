//! HTTP chat gateway (POST JSON to the configured endpoint).

use super::{ChatGateway, ChatReply, ChatRequest, ChatResponse, GatewayError, HealthStatus};
use crate::config::{self, Config};
use crate::conversation::Message;
use async_trait::async_trait;
use std::time::Duration;

const HEALTH_PATH: &str = "/api/health";

/// Gateway to a remote chat endpoint. The endpoint is fixed at construction.
#[derive(Clone)]
pub struct HttpChatGateway {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpChatGateway {
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Self {
        let endpoint = endpoint.into().trim().to_string();
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build().unwrap_or_else(|e| {
            log::warn!("gateway: http client setup failed ({}), using defaults", e);
            reqwest::Client::new()
        });
        Self { endpoint, client }
    }

    /// Build from config: endpoint from CANCHAT_ENDPOINT or `gateway.endpoint`, optional timeout.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config::resolve_endpoint(config),
            config.gateway.timeout_secs.map(Duration::from_secs),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// GET /api/health on the endpoint's host.
    pub async fn health(&self) -> Result<HealthStatus, GatewayError> {
        let url = reqwest::Url::parse(&self.endpoint)
            .and_then(|u| u.join(HEALTH_PATH))
            .map_err(|e| GatewayError::Network {
                detail: format!("invalid endpoint {}: {}", self.endpoint, e),
            })?;
        let res = self.client.get(url).send().await.map_err(network)?;
        decode(res).await
    }
}

fn network(e: reqwest::Error) -> GatewayError {
    GatewayError::Network {
        detail: e.to_string(),
    }
}

/// Map a received response to a decoded body or a server-side failure.
async fn decode<T: serde::de::DeserializeOwned>(res: reqwest::Response) -> Result<T, GatewayError> {
    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(GatewayError::Server {
            status: Some(status.as_u16()),
            detail: format!("{} {}", status, body.trim()),
        });
    }
    let bytes = res.bytes().await.map_err(|e| GatewayError::Server {
        status: Some(status.as_u16()),
        detail: format!("reading body: {}", e),
    })?;
    serde_json::from_slice(&bytes).map_err(|e| GatewayError::Server {
        status: Some(status.as_u16()),
        detail: format!("malformed body: {}", e),
    })
}

#[async_trait]
impl ChatGateway for HttpChatGateway {
    async fn send_turn(&self, latest: &str, history: &[Message]) -> Result<ChatReply, GatewayError> {
        let body = ChatRequest::new(latest, history);
        let res = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(network)?;
        let status = res.status().as_u16();
        let data: ChatResponse = decode(res).await?;
        if data.response.trim().is_empty() {
            return Err(GatewayError::Server {
                status: Some(status),
                detail: "empty response text".to_string(),
            });
        }
        Ok(data.into())
    }
}
