//! The neutral request handed to the provider.

use tongyi_core::Message;
use tongyi_tools::ToolDefinition;

/// A chat request: model id, conversation and the tools the model may call.
#[derive(Debug, Clone, Default)]
pub struct ModelRequest {
    /// Model id, e.g. [`QWEN_PLUS`](crate::models::QWEN_PLUS).
    pub model: String,
    /// Conversation so far.
    pub messages: Vec<Message>,
    /// Tools offered to the model.
    pub tools: Vec<ToolDefinition>,
}

impl ModelRequest {
    /// Create an empty request for `model`.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            tools: Vec::new(),
        }
    }

    /// Append a message.
    #[must_use]
    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Replace the messages.
    #[must_use]
    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    /// Offer a tool.
    #[must_use]
    pub fn with_tool(mut self, tool: ToolDefinition) -> Self {
        self.tools.push(tool);
        self
    }
}
