//! Reference chat service HTTP server.

use crate::config::Config;
use crate::gateway::{ChatRequest, ChatResponse, ErrorBody, HealthStatus};
use crate::service::responder::{OllamaResponder, Responder};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Shared state for the chat service handlers.
#[derive(Clone)]
pub struct ServiceState {
    pub responder: Arc<dyn Responder>,
    /// Result of the startup readiness check, reported by /api/health.
    pub chatbot_loaded: bool,
}

fn now_timestamp() -> String {
    chrono::Local::now().to_rfc3339()
}

fn error_response(status: StatusCode, body: ErrorBody) -> Response {
    (status, Json(body)).into_response()
}

/// Routes and CORS for the service. Exposed so tests can serve it on an ephemeral port.
pub fn router(state: ServiceState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/", get(home))
        .route("/api/health", get(health))
        .route("/api/chat", post(chat))
        .fallback(not_found)
        .layer(cors)
        .with_state(state)
}

/// Run the service on `server.bind:server.port` until Ctrl+C or SIGTERM.
pub async fn run_server(config: Config) -> Result<()> {
    let responder = OllamaResponder::from_config(&config.assistant);
    log::info!("chat service using model {}", responder.model());
    let chatbot_loaded = responder.is_ready().await;
    let state = ServiceState {
        responder: Arc::new(responder),
        chatbot_loaded,
    };

    let bind_addr = format!("{}:{}", config.server.bind.trim(), config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("chat service listening on http://{}", bind_addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("chat service exited")?;
    log::info!("chat service stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                log::warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received");
}

/// GET / — service description.
async fn home() -> Json<serde_json::Value> {
    log::info!("GET /");
    Json(json!({
        "message": "Chatbot CAN 2025 API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "online",
        "endpoints": {
            "home": "GET /",
            "health": "GET /api/health",
            "chat": "POST /api/chat"
        }
    }))
}

/// GET /api/health
async fn health(State(state): State<ServiceState>) -> Json<HealthStatus> {
    log::info!("GET /api/health");
    Json(HealthStatus {
        status: "healthy".to_string(),
        timestamp: now_timestamp(),
        chatbot_loaded: state.chatbot_loaded,
    })
}

/// POST /api/chat — 400 on missing/blank message, 502 when the responder fails.
async fn chat(State(state): State<ServiceState>, body: Bytes) -> Response {
    let req: ChatRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            log::warn!("POST /api/chat: bad body: {}", e);
            return error_response(StatusCode::BAD_REQUEST, ErrorBody::new("no message provided"));
        }
    };
    let question = req.message.trim();
    if question.is_empty() {
        log::warn!("POST /api/chat: empty message");
        return error_response(
            StatusCode::BAD_REQUEST,
            ErrorBody::new("message must not be empty"),
        );
    }
    let history = req.conversation_history.unwrap_or_default();
    log::info!(
        "POST /api/chat: question ({} history entries): {}",
        history.len(),
        question
    );

    match state.responder.respond(question, &history).await {
        Ok(answer) => {
            let mut body = serde_json::to_value(ChatResponse {
                response: answer,
                timestamp: now_timestamp(),
            })
            .unwrap_or_else(|_| json!({}));
            body["status"] = json!("success");
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => {
            log::error!("POST /api/chat: responder failed: {}", e);
            let mut err = ErrorBody::new("an error occurred");
            err.details = Some(e.to_string());
            error_response(StatusCode::BAD_GATEWAY, err)
        }
    }
}

async fn not_found(uri: Uri) -> Response {
    log::warn!("404: {}", uri.path());
    let mut err = ErrorBody::new("endpoint not found");
    err.path = Some(uri.path().to_string());
    error_response(StatusCode::NOT_FOUND, err)
}
