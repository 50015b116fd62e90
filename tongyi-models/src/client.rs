//! Wire client for the DashScope compatible-mode chat-completions endpoint.

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use reqwest::Client;
use serde_json::Value as JsonValue;
use tongyi_streaming::{SseEvent, SseStream};
use tracing::{debug, warn};

use crate::error::{ModelError, ModelResult};
use crate::types::{ApiErrorResponse, ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse};

/// DashScope compatible-mode base URL.
pub const DEFAULT_BASE_URL: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Boxed stream of decoded chunks.
pub type ChunkStream = BoxStream<'static, ModelResult<ChatCompletionChunk>>;

/// Sends chat-completion requests to the vendor.
///
/// The provider is generic over this trait so tests can substitute
/// [`MockChatClient`](crate::mock::MockChatClient) for the HTTP client.
#[async_trait]
pub trait ChatCompletionClient: Send + Sync + 'static {
    /// The credential this client authenticates with.
    fn api_key(&self) -> &str;

    /// Send a request and wait for the whole completion.
    async fn create(&self, request: &ChatCompletionRequest) -> ModelResult<ChatCompletionResponse>;

    /// Send a request and stream the completion chunk by chunk.
    async fn create_stream(&self, request: &ChatCompletionRequest) -> ModelResult<ChunkStream>;
}

/// reqwest-backed [`ChatCompletionClient`].
#[derive(Debug, Clone)]
pub struct HttpChatClient {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl HttpChatClient {
    /// Create a client for the default endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Set a custom base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a preconfigured reqwest client.
    #[must_use]
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, body: &ChatCompletionRequest) -> ModelResult<reqwest::Response> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(handle_error_response(status.as_u16(), &body));
        }
        Ok(response)
    }

    /// Like `ModelError::from`, but reports the timeout this client was built with.
    fn transport_error(&self, err: reqwest::Error) -> ModelError {
        if err.is_timeout() {
            ModelError::Timeout(self.timeout)
        } else {
            ModelError::from(err)
        }
    }
}

#[async_trait]
impl ChatCompletionClient for HttpChatClient {
    fn api_key(&self) -> &str {
        &self.api_key
    }

    async fn create(&self, request: &ChatCompletionRequest) -> ModelResult<ChatCompletionResponse> {
        debug!(model = %request.model, messages = request.messages.len(), "POST chat/completions");
        let response = self.send(request).await?;
        let text = response.text().await.map_err(|e| self.transport_error(e))?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn create_stream(&self, request: &ChatCompletionRequest) -> ModelResult<ChunkStream> {
        let body = request.streaming();
        debug!(model = %body.model, messages = body.messages.len(), "POST chat/completions (stream)");
        let response = self.send(&body).await?;

        let chunks = SseStream::new(response.bytes_stream()).filter_map(|event| async move {
            match event {
                Ok(event) => decode_event(&event),
                Err(e) => Some(Err(ModelError::from(e))),
            }
        });
        Ok(chunks.boxed())
    }
}

/// Decode one SSE event. `[DONE]` and blank keep-alives yield `None`.
fn decode_event(event: &SseEvent) -> Option<ModelResult<ChatCompletionChunk>> {
    if event.is_done() || event.data.trim().is_empty() {
        return None;
    }

    let value: JsonValue = match event.parse_data() {
        Ok(v) => v,
        Err(e) => return Some(Err(e.into())),
    };
    if value.get("error").is_some() {
        warn!("Error event in chat completion stream");
        return Some(Err(match serde_json::from_value::<ApiErrorResponse>(value) {
            Ok(err) => ModelError::Api {
                message: err.error.message,
                code: err.error.code,
            },
            Err(e) => e.into(),
        }));
    }
    Some(serde_json::from_value(value).map_err(ModelError::from))
}

/// Map a non-2xx response onto the error taxonomy.
pub(crate) fn handle_error_response(status: u16, body: &str) -> ModelError {
    if let Ok(err) = serde_json::from_str::<ApiErrorResponse>(body) {
        if status == 401 {
            return ModelError::auth(err.error.message);
        }
        return ModelError::Api {
            message: err.error.message,
            code: err.error.code,
        };
    }
    if status == 401 {
        return ModelError::auth(body);
    }
    ModelError::http(status, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_client_defaults() {
        let client = HttpChatClient::new("sk-test");
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
        assert_eq!(client.api_key(), "sk-test");
        assert_eq!(client.timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = HttpChatClient::new("k").with_base_url("http://localhost:8080/v1/");
        assert_eq!(client.base_url(), "http://localhost:8080/v1");
    }

    #[test]
    fn test_error_mapping() {
        let body = r#"{"error":{"message":"Incorrect API key provided.","type":"invalid_request_error","code":"invalid_api_key"}}"#;
        assert!(matches!(handle_error_response(401, body), ModelError::Authentication(_)));

        let body = r#"{"error":{"message":"Model not exist.","code":"model_not_found"}}"#;
        match handle_error_response(404, body) {
            ModelError::Api { message, code } => {
                assert_eq!(message, "Model not exist.");
                assert_eq!(code.as_deref(), Some("model_not_found"));
            }
            other => panic!("unexpected: {other:?}"),
        }

        match handle_error_response(502, "bad gateway") {
            ModelError::Http { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body, "bad gateway");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_decode_event() {
        assert!(decode_event(&SseEvent::data("[DONE]")).is_none());
        assert!(decode_event(&SseEvent::data("  ")).is_none());

        let chunk = decode_event(&SseEvent::data(
            r#"{"id":"c1","choices":[{"index":0,"delta":{"content":"Hi"}}]}"#,
        ))
        .unwrap()
        .unwrap();
        assert_eq!(chunk.choices[0].delta.content.as_deref(), Some("Hi"));

        let err = decode_event(&SseEvent::data(r#"{"error":{"message":"quota"}}"#))
            .unwrap()
            .unwrap_err();
        assert!(matches!(err, ModelError::Api { ref message, .. } if message == "quota"));

        let err = decode_event(&SseEvent::data("{not json")).unwrap().unwrap_err();
        assert!(matches!(err, ModelError::Serialization(_)));
    }
}
