//! The neutral chat message.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::parts::Part;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions.
    System,
    /// End user input.
    User,
    /// Model output.
    Assistant,
    /// Model output that carries executed tool calls.
    Tool,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        };
        f.write_str(s)
    }
}

/// Whether a message is final or a streamed partial.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// A finished message.
    #[default]
    Completed,
    /// A streamed delta.
    Incomplete,
}

/// A tool call requested by the model, with its result once executed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Vendor-issued call id.
    pub id: String,
    /// Tool name.
    pub name: String,
    /// Raw JSON argument string.
    pub arguments: String,
    /// Handler output. Empty until the call is executed.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub result: String,
}

impl ToolCall {
    /// Create an unexecuted tool call.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
            result: String::new(),
        }
    }

    /// Attach the handler result.
    #[must_use]
    pub fn with_result(mut self, result: impl Into<String>) -> Self {
        self.result = result.into();
        self
    }
}

/// A chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Author role.
    pub role: Role,
    /// Ordered content parts.
    #[serde(default)]
    pub parts: Vec<Part>,
    /// Completion status.
    #[serde(default)]
    pub status: Status,
    /// String metadata such as `finish_reason` or `refusal`.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub metadata: IndexMap<String, String>,
    /// Tool calls, in the order the model issued them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

impl Message {
    /// Create an empty message with the given role.
    #[must_use]
    pub fn new(role: Role) -> Self {
        Self {
            role,
            parts: Vec::new(),
            status: Status::Completed,
            metadata: IndexMap::new(),
            tool_calls: Vec::new(),
        }
    }

    /// A system message with one text part.
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System).with_part(Part::text(text))
    }

    /// A user message with one text part.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User).with_part(Part::text(text))
    }

    /// An assistant message with one text part.
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant).with_part(Part::text(text))
    }

    /// Append a part.
    #[must_use]
    pub fn with_part(mut self, part: impl Into<Part>) -> Self {
        self.parts.push(part.into());
        self
    }

    /// Set the status.
    #[must_use]
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// Insert a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Append a tool call.
    #[must_use]
    pub fn with_tool_call(mut self, call: ToolCall) -> Self {
        self.tool_calls.push(call);
        self
    }

    /// Concatenated text of all text parts.
    #[must_use]
    pub fn text(&self) -> String {
        self.parts.iter().filter_map(Part::as_text).collect()
    }

    /// The first text part, if any.
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.parts.iter().find_map(Part::as_text)
    }

    /// Check if this message carries tool calls.
    #[must_use]
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Check if this message is a streamed partial.
    #[must_use]
    pub fn is_incomplete(&self) -> bool {
        self.status == Status::Incomplete
    }
}
