//! Conversation controller: owns the transcript, the draft and the busy state, and runs turns
//! through a [`ChatGateway`].
//!
//! A turn is: submit (append user message, go busy) → remote call → append bot reply or
//! fallback → back to idle. Only one turn can be outstanding.

use crate::conversation::{Conversation, Message, Sender};
use crate::gateway::{ChatGateway, ChatReply, GatewayError};
use crate::scroll::{ScrollScheduler, ScrollTarget};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    AwaitingReply,
}

/// Key event raised by the input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Commit key.
    Enter,
    Char(char),
}

/// Result of [`Controller::handle_submit_key`].
#[derive(Debug)]
pub enum KeyOutcome {
    /// Default input behaviour was suppressed and a submission attempted; `None` when it was dropped.
    Handled(Option<PendingTurn>),
    /// Not a commit; the input field keeps its default behaviour.
    PassThrough,
}

/// A submitted turn waiting for its reply. Created only by [`Controller::submit`].
#[derive(Debug)]
pub struct PendingTurn {
    text: String,
    history: Vec<Message>,
}

impl PendingTurn {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Conversation snapshot at submission, including the user message.
    pub fn history(&self) -> &[Message] {
        &self.history
    }
}

pub struct Controller<G> {
    gateway: G,
    conversation: Conversation,
    draft: String,
    state: ControllerState,
    scroll: ScrollScheduler,
}

impl<G: ChatGateway> Controller<G> {
    pub fn new(gateway: G, welcome: impl Into<String>) -> Self {
        Self {
            gateway,
            conversation: Conversation::new(welcome),
            draft: String::new(),
            state: ControllerState::Idle,
            scroll: ScrollScheduler::new(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        self.conversation.messages()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn draft_mut(&mut self) -> &mut String {
        &mut self.draft
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state == ControllerState::AwaitingReply
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Start a turn with `text`. Dropped (no mutation) when `text` is blank or a turn is outstanding.
    pub fn submit(&mut self, text: &str) -> Option<PendingTurn> {
        if text.trim().is_empty() || self.is_busy() {
            return None;
        }
        let text = text.to_string();
        self.conversation.push(Sender::User, text.clone());
        self.draft.clear();
        self.state = ControllerState::AwaitingReply;
        self.scroll.request();
        Some(PendingTurn {
            text,
            history: self.conversation.messages().to_vec(),
        })
    }

    pub fn submit_draft(&mut self) -> Option<PendingTurn> {
        let text = self.draft.clone();
        self.submit(&text)
    }

    /// Commit key without shift submits the draft; anything else is left to the input field.
    pub fn handle_submit_key(&mut self, key: Key, shift_held: bool) -> KeyOutcome {
        if key == Key::Enter && !shift_held {
            KeyOutcome::Handled(self.submit_draft())
        } else {
            KeyOutcome::PassThrough
        }
    }

    /// Send the pending turn and append the reply (or the fallback).
    pub async fn run_turn(&mut self, turn: PendingTurn) -> &Message {
        let result = self.gateway.send_turn(&turn.text, &turn.history).await;
        self.complete(turn, result)
    }

    /// Submit `text` and run the turn. `None` when the submission was dropped.
    pub async fn send(&mut self, text: &str) -> Option<&Message> {
        let turn = self.submit(text)?;
        Some(self.run_turn(turn).await)
    }

    /// Resolve a pending turn with the gateway result. Always appends one bot message and returns to idle.
    pub fn complete(&mut self, turn: PendingTurn, result: Result<ChatReply, GatewayError>) -> &Message {
        let reply = match result {
            Ok(reply) => reply.response,
            Err(e) => {
                log::warn!("chat: remote call failed ({:?}): {}; using local reply", e.kind(), e);
                self.gateway.local_fallback(&turn.text)
            }
        };
        self.state = ControllerState::Idle;
        self.scroll.request();
        self.conversation.push(Sender::Bot, reply)
    }

    /// Called by the view after it has laid out the transcript. Runs at most one pending scroll.
    pub fn after_layout(&mut self, target: Option<&mut dyn ScrollTarget>) -> Option<usize> {
        self.scroll.after_layout(self.conversation.len(), target)
    }

    pub fn scroll_pending(&self) -> bool {
        self.scroll.is_pending()
    }
}
