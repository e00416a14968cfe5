//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.canchat/config.json`) and environment.
//! The chat endpoint is resolved once at startup and handed to the gateway; it is never changed per call.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5555/api/chat";
pub const DEFAULT_WELCOME_MESSAGE: &str = "Bienvenue au chatbot CAN 2025 Maroc ! 🇲🇦⚽";
const DEFAULT_OLLAMA_BASE_URL: &str = "http://127.0.0.1:11434";
const DEFAULT_MODEL: &str = "llama3.2:latest";

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Remote chat endpoint used by the client.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Conversation defaults (welcome message).
    #[serde(default)]
    pub chat: ChatConfig,

    /// Reference chat service bind and port (`canchat serve`).
    #[serde(default)]
    pub server: ServerConfig,

    /// Model backing the reference chat service.
    #[serde(default)]
    pub assistant: AssistantConfig,
}

/// Where the client sends conversation turns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Full URL of the chat endpoint (default http://127.0.0.1:5555/api/chat). Overridden by CANCHAT_ENDPOINT env.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Optional transport timeout in seconds. When absent the HTTP client's own behaviour applies.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatConfig {
    /// First bot message seeded into every new conversation.
    #[serde(default = "default_welcome_message")]
    pub welcome_message: String,
}

fn default_welcome_message() -> String {
    DEFAULT_WELCOME_MESSAGE.to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            welcome_message: default_welcome_message(),
        }
    }
}

/// Reference chat service bind and port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Port for HTTP (default 5555).
    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_server_bind")]
    pub bind: String,
}

fn default_server_port() -> u16 {
    5555
}

fn default_server_bind() -> String {
    "127.0.0.1".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
            bind: default_server_bind(),
        }
    }
}

/// Ollama settings for the reference chat service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantConfig {
    /// Ollama base URL (default http://127.0.0.1:11434).
    pub ollama_base_url: Option<String>,
    /// Model name as shown by `ollama list` (default llama3.2:latest).
    pub model: Option<String>,
}

/// Resolve the chat endpoint: env CANCHAT_ENDPOINT overrides config.
pub fn resolve_endpoint(config: &Config) -> String {
    std::env::var("CANCHAT_ENDPOINT")
        .ok()
        .and_then(|s| {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        })
        .or_else(|| {
            let e = config.gateway.endpoint.trim();
            if e.is_empty() {
                None
            } else {
                Some(e.to_string())
            }
        })
        .unwrap_or_else(default_endpoint)
}

/// Model for the reference chat service; blank or missing falls back to the default.
pub fn resolve_model(assistant: &AssistantConfig) -> String {
    assistant
        .model
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_MODEL)
        .to_string()
}

/// Welcome message for new conversations; blank or whitespace falls back to the default.
pub fn resolve_welcome_message(chat: &ChatConfig) -> String {
    let w = chat.welcome_message.trim();
    if w.is_empty() {
        DEFAULT_WELCOME_MESSAGE.to_string()
    } else {
        w.to_string()
    }
}

pub fn resolve_ollama_base_url(assistant: &AssistantConfig) -> String {
    assistant
        .ollama_base_url
        .as_deref()
        .map(|s| s.trim().trim_end_matches('/'))
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_OLLAMA_BASE_URL)
        .to_string()
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("CANCHAT_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".canchat").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path, CANCHAT_CONFIG_PATH, or the default. Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

/// Write the default config to `path` unless a file is already there. Returns true when a file was written.
pub fn init_config(path: &Path) -> Result<bool> {
    if path.exists() {
        log::debug!("config already exists at {}, skipping", path.display());
        return Ok(false);
    }
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating config directory {}", dir.display()))?;
    let body = serde_json::to_string_pretty(&Config::default())?;
    std::fs::write(path, body)
        .with_context(|| format!("writing default config to {}", path.display()))?;
    log::info!("created default config at {}", path.display());
    Ok(true)
}
