//! Scripted wire client for testing.
//!
//! [`MockChatClient`] returns pre-configured completions and chunk scripts in
//! order and records every request it receives.
//!
//! ```rust
//! use tongyi_models::mock::MockChatClient;
//!
//! let client = MockChatClient::new()
//!     .with_text_response("First response")
//!     .with_tool_call_response("call_1", "weather", r#"{"city":"Beijing"}"#);
//! assert_eq!(client.request_count(), 0);
//! ```

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;

use crate::client::{ChatCompletionClient, ChunkStream};
use crate::error::ModelResult;
use crate::types::{
    ChatChoice, ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse, ChunkChoice,
    ChunkDelta, ResponseMessage, ToolCall,
};

/// A key that passes the format check.
pub const MOCK_API_KEY: &str = "sk-mock-00000000000000000000";

const FALLBACK_TEXT: &str = "Mock response";

type StreamScript = Vec<ModelResult<ChatCompletionChunk>>;

/// A [`ChatCompletionClient`] with scripted behaviour.
///
/// When a queue runs dry the client answers with a single `"Mock response"`
/// completion (or chunk).
#[derive(Debug, Clone)]
pub struct MockChatClient {
    api_key: String,
    responses: Arc<Mutex<VecDeque<ModelResult<ChatCompletionResponse>>>>,
    streams: Arc<Mutex<VecDeque<StreamScript>>>,
    requests: Arc<Mutex<Vec<ChatCompletionRequest>>>,
}

impl Default for MockChatClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChatClient {
    /// Create a mock with a valid-looking key and empty scripts.
    pub fn new() -> Self {
        Self {
            api_key: MOCK_API_KEY.to_string(),
            responses: Arc::new(Mutex::new(VecDeque::new())),
            streams: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Override the API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    /// Queue a completion for `create`.
    #[must_use]
    pub fn with_response(self, response: ChatCompletionResponse) -> Self {
        self.responses.lock().push_back(Ok(response));
        self
    }

    /// Queue a plain text completion.
    #[must_use]
    pub fn with_text_response(self, text: impl Into<String>) -> Self {
        self.with_response(Self::text_completion(text))
    }

    /// Queue a completion that calls one tool.
    #[must_use]
    pub fn with_tool_call_response(
        self,
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        self.with_response(Self::tool_call_completion(id, name, arguments))
    }

    /// Queue a failure for `create`.
    #[must_use]
    pub fn with_error(self, error: crate::error::ModelError) -> Self {
        self.responses.lock().push_back(Err(error));
        self
    }

    /// Queue a chunk script for `create_stream`. Each item is yielded in
    /// order; an `Err` item is yielded like any other.
    #[must_use]
    pub fn with_stream(self, script: StreamScript) -> Self {
        self.streams.lock().push_back(script);
        self
    }

    /// Queue a stream of text chunks, one per fragment.
    #[must_use]
    pub fn with_text_stream(self, fragments: &[&str]) -> Self {
        let script = fragments.iter().map(|f| Ok(Self::text_chunk(*f))).collect();
        self.with_stream(script)
    }

    /// Every request received so far.
    pub fn recorded_requests(&self) -> Vec<ChatCompletionRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Forget recorded requests.
    pub fn clear_requests(&self) {
        self.requests.lock().clear();
    }

    /// A completion with one text choice.
    pub fn text_completion(text: impl Into<String>) -> ChatCompletionResponse {
        ChatCompletionResponse {
            id: "chatcmpl-mock".to_string(),
            object: "chat.completion".to_string(),
            model: "mock".to_string(),
            choices: vec![ChatChoice {
                index: 0,
                message: ResponseMessage {
                    content: Some(text.into()),
                    ..ResponseMessage::default()
                },
                finish_reason: Some("stop".to_string()),
            }],
            ..ChatCompletionResponse::default()
        }
    }

    /// A completion with one choice calling one tool.
    pub fn tool_call_completion(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> ChatCompletionResponse {
        let mut response = Self::text_completion("");
        response.choices[0].message.content = None;
        response.choices[0].message.tool_calls = Some(vec![ToolCall::function(id, name, arguments)]);
        response.choices[0].finish_reason = Some("tool_calls".to_string());
        response
    }

    /// A chunk carrying one text fragment on choice 0.
    pub fn text_chunk(fragment: impl Into<String>) -> ChatCompletionChunk {
        ChatCompletionChunk {
            id: "chatcmpl-mock".to_string(),
            object: "chat.completion.chunk".to_string(),
            model: "mock".to_string(),
            choices: vec![ChunkChoice {
                index: 0,
                delta: ChunkDelta {
                    content: Some(fragment.into()),
                    ..ChunkDelta::default()
                },
                finish_reason: None,
            }],
            ..ChatCompletionChunk::default()
        }
    }
}

#[async_trait]
impl ChatCompletionClient for MockChatClient {
    fn api_key(&self) -> &str {
        &self.api_key
    }

    async fn create(&self, request: &ChatCompletionRequest) -> ModelResult<ChatCompletionResponse> {
        self.requests.lock().push(request.clone());
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(Self::text_completion(FALLBACK_TEXT)))
    }

    async fn create_stream(&self, request: &ChatCompletionRequest) -> ModelResult<ChunkStream> {
        self.requests.lock().push(request.streaming());
        let script = self
            .streams
            .lock()
            .pop_front()
            .unwrap_or_else(|| vec![Ok(Self::text_chunk(FALLBACK_TEXT))]);
        Ok(stream::iter(script).boxed())
    }
}
