//! Model responses.

use serde::{Deserialize, Serialize};

use super::message::{Message, Role};

/// The messages produced by one request cycle, or by one streamed chunk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    /// Result messages, one per vendor choice.
    pub messages: Vec<Message>,
}

impl ModelResponse {
    /// Create an empty response.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a response from messages.
    #[must_use]
    pub fn with_messages(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    /// The first message, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Message> {
        self.messages.first()
    }

    /// Concatenated text of every message.
    #[must_use]
    pub fn text(&self) -> String {
        self.messages.iter().map(Message::text).collect()
    }

    /// Whether any message executed tool calls and so needs another cycle.
    #[must_use]
    pub fn requires_followup(&self) -> bool {
        self.messages
            .iter()
            .any(|m| m.role == Role::Tool && m.has_tool_calls())
    }

    /// Check if there are no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
