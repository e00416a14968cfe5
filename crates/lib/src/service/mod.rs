//! Reference chat service: the HTTP backend the client gateway talks to.
//!
//! `GET /`, `GET /api/health` and `POST /api/chat` on a single port, answers generated by a
//! [`Responder`] (Ollama by default).

mod responder;
mod server;

pub use responder::{build_messages, OllamaResponder, Responder, ResponderError};
pub use server::{router, run_server, ServiceState};
