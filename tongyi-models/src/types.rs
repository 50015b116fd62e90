//! DashScope compatible-mode wire types.
//!
//! These mirror the OpenAI chat-completions schema that DashScope accepts at
//! its compatible-mode endpoint.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

// ============================================================================
// Request Types
// ============================================================================

/// Body of `POST /chat/completions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    /// Qwen model name, e.g. `qwen-plus`.
    pub model: String,
    /// Conversation so far, oldest first.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature in `[0, 2)`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Top-p cutoff.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Upper bound on generated tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_completion_tokens: Option<u64>,
    /// Reasoning effort hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_effort: Option<String>,
    /// Functions the model may call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ChatTool>>,
    /// `true` for SSE delivery.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    /// Set together with `stream`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_options: Option<StreamOptions>,
}

impl ChatCompletionRequest {
    /// Create a new request.
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            ..Self::default()
        }
    }

    /// A copy of this request configured for SSE streaming.
    #[must_use]
    pub fn streaming(&self) -> Self {
        Self {
            stream: Some(true),
            stream_options: Some(StreamOptions {
                include_usage: true,
            }),
            ..self.clone()
        }
    }
}

/// Extra knobs for SSE requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamOptions {
    /// Ask for a trailing usage-only chunk.
    pub include_usage: bool,
}

/// One entry of `messages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// `system`, `user`, `assistant` or `tool`.
    pub role: String,
    /// Text or parts; absent on some assistant tool-call turns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,
    /// Calls announced by an assistant turn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// Set on `tool` messages to pair them with a call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    fn with_role(role: &str, content: Option<MessageContent>) -> Self {
        Self {
            role: role.to_string(),
            content,
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// A system message made of text parts.
    pub fn system(parts: Vec<ContentPart>) -> Self {
        Self::with_role("system", Some(MessageContent::Parts(parts)))
    }

    /// A user message made of content parts.
    pub fn user(parts: Vec<ContentPart>) -> Self {
        Self::with_role("user", Some(MessageContent::Parts(parts)))
    }

    /// An assistant text message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role("assistant", Some(MessageContent::Text(content.into())))
    }

    /// An assistant message announcing tool calls.
    pub fn assistant_tool_calls(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls: Some(tool_calls),
            ..Self::with_role("assistant", content.map(MessageContent::Text))
        }
    }

    /// A tool result message.
    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::with_role("tool", Some(MessageContent::Text(content.into())))
        }
    }
}

/// Either a bare string or a list of parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Plain string.
    Text(String),
    /// Ordered parts.
    Parts(Vec<ContentPart>),
}

/// One element of a multipart `content` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentPart {
    /// `{"type":"text"}`.
    #[serde(rename = "text")]
    Text {
        /// The text.
        text: String,
    },
    /// `{"type":"image_url"}`.
    #[serde(rename = "image_url")]
    ImageUrl {
        /// Where the image lives.
        image_url: ImageUrlContent,
    },
    /// `{"type":"input_audio"}`.
    #[serde(rename = "input_audio")]
    InputAudio {
        /// Where the audio lives.
        input_audio: AudioContent,
    },
    /// `{"type":"file"}`.
    #[serde(rename = "file")]
    File {
        /// Inline file payload.
        file: FileContent,
    },
}

impl ContentPart {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create an image URL part.
    pub fn image_url(url: impl Into<String>) -> Self {
        Self::ImageUrl {
            image_url: ImageUrlContent { url: url.into() },
        }
    }

    /// Create an input audio part.
    pub fn input_audio(data: impl Into<String>, format: impl Into<String>) -> Self {
        Self::InputAudio {
            input_audio: AudioContent {
                data: data.into(),
                format: format.into(),
            },
        }
    }

    /// Create a file part from base64 data.
    pub fn file(file_data: impl Into<String>, filename: impl Into<String>) -> Self {
        Self::File {
            file: FileContent {
                file_data: Some(file_data.into()),
                filename: Some(filename.into()),
            },
        }
    }
}

/// Payload of an `image_url` part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrlContent {
    /// `https://` or `data:` URL.
    pub url: String,
}

/// Payload of an `input_audio` part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioContent {
    /// Audio payload (URL or base64 data URL).
    pub data: String,
    /// Audio format (wav, mp3).
    pub format: String,
}

/// Payload of a `file` part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileContent {
    /// Base64-encoded file data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_data: Option<String>,
    /// Optional display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

/// Entry of the `tools` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTool {
    /// Always `function`.
    #[serde(rename = "type")]
    pub tool_type: String,
    /// Name, description and parameters.
    pub function: FunctionDefinition,
}

impl ChatTool {
    /// Create a function tool.
    pub fn function(function: FunctionDefinition) -> Self {
        Self {
            tool_type: "function".to_string(),
            function,
        }
    }
}

/// Callable function advertised to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    /// Name the model uses to call it.
    pub name: String,
    /// Shown to the model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON schema of the arguments object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, JsonValue>>,
}

/// Fully formed call in a non-streaming message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Identifier echoed by the tool result.
    pub id: String,
    /// Always `function` for Qwen.
    #[serde(rename = "type", default = "function_type")]
    pub tool_type: String,
    /// Target function and arguments.
    pub function: FunctionCall,
}

fn function_type() -> String {
    "function".to_string()
}

impl ToolCall {
    /// Create a function tool call.
    pub fn function(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            tool_type: function_type(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

/// Name plus raw JSON arguments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Callee.
    pub name: String,
    /// JSON-encoded argument object.
    #[serde(default)]
    pub arguments: String,
}

// ============================================================================
// Response Types
// ============================================================================

/// Non-streaming reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    /// Completion id.
    #[serde(default)]
    pub id: String,
    /// `chat.completion`.
    #[serde(default)]
    pub object: String,
    /// Unix seconds.
    #[serde(default)]
    pub created: u64,
    /// Model that answered.
    #[serde(default)]
    pub model: String,
    /// One entry per requested choice.
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    /// Token accounting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// One alternative in a reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatChoice {
    /// Position in `choices`.
    #[serde(default)]
    pub index: u32,
    /// Assistant turn.
    pub message: ResponseMessage,
    /// `stop`, `length`, `tool_calls`, ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Assistant turn inside a choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMessage {
    /// Usually `assistant`.
    #[serde(default = "assistant_role")]
    pub role: String,
    /// Generated text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Calls the model wants executed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// Set when the content filter refused.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refusal: Option<String>,
    /// Spoken reply, for audio models.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<ResponseAudio>,
}

fn assistant_role() -> String {
    "assistant".to_string()
}

impl Default for ResponseMessage {
    fn default() -> Self {
        Self {
            role: assistant_role(),
            content: None,
            tool_calls: None,
            refusal: None,
            audio: None,
        }
    }
}

impl ResponseMessage {
    /// Tool calls, or an empty slice.
    pub fn tool_calls(&self) -> &[ToolCall] {
        self.tool_calls.as_deref().unwrap_or_default()
    }

    /// The assistant message that echoes this response back into the
    /// conversation.
    pub fn to_param(&self) -> ChatMessage {
        let content = self.content.clone().filter(|c| !c.is_empty());
        if self.tool_calls().is_empty() {
            ChatMessage::assistant(content.unwrap_or_default())
        } else {
            ChatMessage::assistant_tool_calls(content, self.tool_calls().to_vec())
        }
    }
}

/// Audio output attached to a response message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseAudio {
    /// Audio ID.
    #[serde(default)]
    pub id: String,
    /// Base64-encoded audio bytes.
    #[serde(default)]
    pub data: String,
    /// Transcript of the audio.
    #[serde(default)]
    pub transcript: String,
    /// Expiry timestamp.
    #[serde(default)]
    pub expires_at: u64,
}

/// Token counts for one completion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    /// Input side.
    #[serde(default)]
    pub prompt_tokens: u64,
    /// Output side.
    #[serde(default)]
    pub completion_tokens: u64,
    /// Sum of both.
    #[serde(default)]
    pub total_tokens: u64,
}

// ============================================================================
// Streaming Types
// ============================================================================

/// One SSE `data:` event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionChunk {
    /// Completion id, shared by all chunks.
    #[serde(default)]
    pub id: String,
    /// `chat.completion.chunk`.
    #[serde(default)]
    pub object: String,
    /// Unix seconds.
    #[serde(default)]
    pub created: u64,
    /// Model that answered.
    #[serde(default)]
    pub model: String,
    /// Deltas, empty on the usage-only chunk.
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
    /// Token usage (only on the final chunk with `include_usage`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// Delta for one choice index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkChoice {
    /// Position in `choices`.
    #[serde(default)]
    pub index: u32,
    /// Incremental fields.
    #[serde(default)]
    pub delta: ChunkDelta,
    /// Present on the closing delta.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Incremental assistant fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkDelta {
    /// Sent once, on the first delta.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Text fragment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Tool call fragments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ChunkToolCall>>,
    /// Refusal fragment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refusal: Option<String>,
}

/// Fragment of a tool call, keyed by `index`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkToolCall {
    /// Slot of the call being built.
    #[serde(default)]
    pub index: u32,
    /// Only on the fragment that opens the call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Only on the opening fragment.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub tool_type: Option<String>,
    /// Name and argument fragments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<ChunkFunction>,
}

/// Function fields of a fragment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkFunction {
    /// Only on the opening fragment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Next slice of the JSON arguments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
}

// ============================================================================
// Error Types
// ============================================================================

/// Error body returned by the compatible-mode endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    /// Error details.
    pub error: ApiErrorBody,
}

/// API error body.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// Error message.
    pub message: String,
    /// Error type.
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    /// Error code.
    #[serde(default)]
    pub code: Option<String>,
}
