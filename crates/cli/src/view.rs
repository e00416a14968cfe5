//! Terminal rendering of the transcript.
//!
//! `layout` stages lines for messages not shown yet; the controller's scroll pass reveals them.

use lib::conversation::{Message, Sender};
use lib::scroll::{ScrollTarget, ScrollUnavailable};
use std::io::Write;

pub struct TerminalView {
    /// Formatted messages, one entry per transcript index.
    staged: Vec<String>,
    /// Number of messages already printed.
    shown: usize,
}

impl Default for TerminalView {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalView {
    pub fn new() -> Self {
        Self {
            staged: Vec::new(),
            shown: 0,
        }
    }

    pub fn layout(&mut self, messages: &[Message]) {
        for m in &messages[self.staged.len().min(messages.len())..] {
            self.staged.push(format_message(m));
        }
    }

    pub fn waiting(&self) {
        let mut out = std::io::stdout();
        let _ = writeln!(out, "  …");
        let _ = out.flush();
    }
}

impl ScrollTarget for TerminalView {
    fn scroll_to_bottom(&mut self, last_index: usize) -> Result<(), ScrollUnavailable> {
        if last_index >= self.staged.len() {
            return Err(ScrollUnavailable);
        }
        let mut out = std::io::stdout().lock();
        let start = self.shown.min(last_index + 1);
        for line in &self.staged[start..=last_index] {
            writeln!(out, "{}", line).map_err(|_| ScrollUnavailable)?;
        }
        self.shown = self.shown.max(last_index + 1);
        out.flush().map_err(|_| ScrollUnavailable)
    }
}

fn format_message(m: &Message) -> String {
    let who = match m.sender() {
        Sender::User => "vous",
        Sender::Bot => "bot",
    };
    let time = m.timestamp().with_timezone(&chrono::Local).format("%H:%M");
    let indent = " ".repeat(who.len() + 10);
    let body = m.text().lines().collect::<Vec<_>>().join(&format!("\n{}", indent));
    format!("[{}] {}> {}", time, who, body)
}
