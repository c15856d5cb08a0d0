use serde::{Deserialize, Serialize};

use crate::types::{Message, Model, Role};

/// A content part of an outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Plain text.
    Text {
        /// The text content.
        text: String,
    },
}

impl ContentPart {
    /// Create a text content part.
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }
}

/// A message as sent to the chat-completions endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message.
    pub role: Role,

    /// The content parts of the message.
    pub content: Vec<ContentPart>,
}

impl ChatMessage {
    /// Create a message with a single text part.
    pub fn new_with_text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: vec![ContentPart::text(text)],
        }
    }

    /// Create a user message with a single text part.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new_with_text(Role::User, text)
    }

    /// Returns the concatenated text of all parts.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(|part| match part {
                ContentPart::Text { text } => text.as_str(),
            })
            .collect()
    }
}

impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        Self::new_with_text(message.role(), message.text())
    }
}

/// Request body for the chat-completions endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The model that will complete the conversation.
    pub model: Model,

    /// The conversation so far, ending with the new user message.
    pub messages: Vec<ChatMessage>,
}

impl ChatRequest {
    /// Create a new request.
    pub fn new(model: Model, messages: Vec<ChatMessage>) -> Self {
        Self { model, messages }
    }
}
