//! Conversation transcript: ordered messages from the user and the bot.
//!
//! Insertion order is display order and is also the history sent to the chat endpoint.
//! Message ids come from a counter owned by the conversation, not from the list length.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One transcript entry. Fields are private so sender and timestamp cannot change after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    id: u64,
    #[serde(rename = "message")]
    text: String,
    sender: Sender,
    timestamp: DateTime<Utc>,
}

impl Message {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Append-only ordered list of messages, seeded with one welcome message from the bot.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
    next_id: u64,
}

impl Conversation {
    pub fn new(welcome: impl Into<String>) -> Self {
        let mut conversation = Self {
            messages: Vec::new(),
            next_id: 1,
        };
        conversation.push(Sender::Bot, welcome);
        conversation
    }

    /// Append a message stamped with the next id and the current time.
    pub fn push(&mut self, sender: Sender, text: impl Into<String>) -> &Message {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(Message {
            id,
            text: text.into(),
            sender,
            timestamp: Utc::now(),
        });
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
