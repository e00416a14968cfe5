//! Ollama client backing the reference chat service.

mod ollama;

pub use ollama::{ChatCompletion, ChatMessage, OllamaClient, OllamaError, OllamaModel};
