//! Integration tests: serve the chat service router on an ephemeral port with a stub responder,
//! then drive `HttpChatGateway` and the controller against it. No Ollama required.

use async_trait::async_trait;
use lib::controller::Controller;
use lib::conversation::Sender;
use lib::gateway::{ChatGateway, FailureKind, FallbackTopic, HttpChatGateway, WireMessage};
use lib::service::{router, Responder, ResponderError, ServiceState};
use std::sync::{Arc, Mutex};

/// Answers with a fixed prefix and remembers the history lengths it saw.
struct EchoResponder {
    seen_history: Mutex<Vec<usize>>,
}

#[async_trait]
impl Responder for EchoResponder {
    async fn respond(&self, question: &str, history: &[WireMessage]) -> Result<String, ResponderError> {
        self.seen_history.lock().unwrap().push(history.len());
        Ok(format!("echo: {}", question))
    }
}

struct BrokenResponder;

#[async_trait]
impl Responder for BrokenResponder {
    async fn respond(&self, _: &str, _: &[WireMessage]) -> Result<String, ResponderError> {
        Err(ResponderError::Empty)
    }
}

async fn spawn_service(responder: Arc<dyn Responder>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let port = listener.local_addr().expect("local_addr").port();
    let app = router(ServiceState {
        responder,
        chatbot_loaded: true,
    });
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://127.0.0.1:{}", port)
}

fn closed_port_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
    let port = listener.local_addr().expect("local_addr").port();
    drop(listener);
    format!("http://127.0.0.1:{}/api/chat", port)
}

#[tokio::test]
async fn send_turn_returns_remote_reply() {
    let responder = Arc::new(EchoResponder {
        seen_history: Mutex::new(Vec::new()),
    });
    let base = spawn_service(responder.clone()).await;
    let gateway = HttpChatGateway::new(format!("{}/api/chat", base), None);

    let mut controller = Controller::new(gateway, "Bienvenue");
    let msg = controller.send("Quand commence la CAN ?").await.expect("turn ran");
    assert_eq!(msg.sender(), Sender::Bot);
    assert_eq!(msg.text(), "echo: Quand commence la CAN ?");
    assert_eq!(controller.messages().len(), 3);
    assert!(!controller.is_busy());
    // Welcome + the new user message.
    assert_eq!(*responder.seen_history.lock().unwrap(), vec![2]);
}

#[tokio::test]
async fn health_reports_loaded_chatbot() {
    let base = spawn_service(Arc::new(BrokenResponder)).await;
    let gateway = HttpChatGateway::new(format!("{}/api/chat", base), None);
    let health = gateway.health().await.expect("health");
    assert_eq!(health.status, "healthy");
    assert!(health.chatbot_loaded);
}

#[tokio::test]
async fn blank_message_is_rejected_with_400() {
    let base = spawn_service(Arc::new(BrokenResponder)).await;
    let gateway = HttpChatGateway::new(format!("{}/api/chat", base), None);
    let err = gateway.send_turn("   ", &[]).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::ServerFailure);
    assert!(matches!(err, lib::gateway::GatewayError::Server { status: Some(400), .. }));
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let base = spawn_service(Arc::new(BrokenResponder)).await;
    let res = reqwest::get(format!("{}/nope", base)).await.expect("request");
    assert_eq!(res.status().as_u16(), 404);
    let json: serde_json::Value = res.json().await.expect("json");
    assert_eq!(json["path"], "/nope");
}

#[tokio::test]
async fn responder_failure_falls_back_locally() {
    let base = spawn_service(Arc::new(BrokenResponder)).await;
    let gateway = HttpChatGateway::new(format!("{}/api/chat", base), None);
    let err = gateway.send_turn("salut", &[]).await.unwrap_err();
    assert!(matches!(err, lib::gateway::GatewayError::Server { status: Some(502), .. }));

    let mut controller = Controller::new(gateway, "Bienvenue");
    let msg = controller.send("Combien d'équipes participent?").await.expect("turn ran");
    assert_eq!(msg.text(), FallbackTopic::Teams.reply());
    assert!(!controller.is_busy());
}

#[tokio::test]
async fn unreachable_endpoint_is_network_failure() {
    let gateway = HttpChatGateway::new(closed_port_endpoint(), None);
    let err = gateway.send_turn("Bonjour Maroc", &[]).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::NetworkFailure);

    let mut controller = Controller::new(gateway, "Bienvenue");
    let msg = controller.send("Bonjour Maroc").await.expect("turn ran");
    assert_eq!(msg.text(), FallbackTopic::Host.reply());
    assert_eq!(controller.messages().len(), 3);
}

#[tokio::test]
async fn malformed_success_body_is_server_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("local_addr").port();
    let app = axum::Router::new().route(
        "/api/chat",
        axum::routing::post(|| async { "not json" }),
    );
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    let gateway = HttpChatGateway::new(format!("http://127.0.0.1:{}/api/chat", port), None);
    let err = gateway.send_turn("date ?", &[]).await.unwrap_err();
    assert!(matches!(err, lib::gateway::GatewayError::Server { status: Some(200), .. }));
}

#[tokio::test]
async fn truncated_success_body_is_server_failure() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("local_addr").port();
    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;
        // Status line arrives, then the connection drops before the declared body length.
        let _ = socket
            .write_all(
                b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 100\r\n\r\n{\"resp",
            )
            .await;
        let _ = socket.shutdown().await;
    });
    let gateway = HttpChatGateway::new(format!("http://127.0.0.1:{}/api/chat", port), None);
    let err = gateway.send_turn("stade ?", &[]).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::ServerFailure);
    assert!(matches!(err, lib::gateway::GatewayError::Server { status: Some(200), .. }));
}
