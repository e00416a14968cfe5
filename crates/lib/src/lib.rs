//! CAN 2025 chat core library: conversation controller, chat gateway with local fallback,
//! and the reference chat service, shared by the `canchat` CLI.

pub mod config;
pub mod controller;
pub mod conversation;
pub mod gateway;
pub mod llm;
pub mod scroll;
pub mod service;
