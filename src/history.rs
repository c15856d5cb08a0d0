//! Conversation history for one model session.

use crate::types::{ChatMessage, Message};

/// Ordered log of completed turns.
///
/// Turns are appended only after a successful exchange, so the log always
/// starts with a user message and never holds a turn whose request failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    messages: Vec<Message>,
}

impl History {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a completed exchange.
    ///
    /// The user message is always appended; the assistant message only when
    /// the response carried a choice.
    pub fn record_exchange(&mut self, user_text: impl Into<String>, reply: Option<String>) {
        self.messages.push(Message::user(user_text));
        if let Some(reply) = reply {
            self.messages.push(Message::assistant(reply));
        }
    }

    /// Drops every message.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Returns the messages in insertion order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if no turn has been recorded.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Builds the outbound message sequence for a new user turn.
    ///
    /// Every recorded message becomes one single-part transport message, in
    /// order, followed by `user_text` as a user message.
    pub fn outbound(&self, user_text: &str) -> Vec<ChatMessage> {
        self.messages
            .iter()
            .map(ChatMessage::from)
            .chain(std::iter::once(ChatMessage::user(user_text)))
            .collect()
    }
}
