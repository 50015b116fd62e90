//! The chat provider: request/response cycles with tool iteration.
//!
//! [`ChatProvider::generate`] runs cycles until the model stops calling tools
//! or the iteration budget is spent. [`ChatProvider::new_stream`] does the
//! same on a background task, relaying partial messages through a
//! [`StreamPipe`] as they arrive.

use std::sync::Arc;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tongyi_core::{generate_run_id, ModelOptions, ModelResponse};
use tongyi_streaming::{PipeSender, StreamPipe, DEFAULT_PIPE_CAPACITY};
use tongyi_tools::{ToolContext, ToolDefinition};
use tracing::{debug, error, info};

use crate::accumulator::ChatCompletionAccumulator;
use crate::assemble::{choices_to_response, chunk_choices_to_response};
use crate::client::ChatCompletionClient;
use crate::error::{ModelError, ModelResult};
use crate::models::is_valid_api_key;
use crate::request::ModelRequest;
use crate::translate::to_chat_completion_request;
use crate::types::{ChatCompletionRequest, ChatCompletionResponse};

/// Pipe of responses produced by [`ChatProvider::new_stream`].
pub type ResponseStream = StreamPipe<ModelResponse, ModelError>;

/// Per-call context: run id and cancellation.
#[derive(Debug, Clone)]
pub struct RequestContext {
    run_id: String,
    cancel: CancellationToken,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestContext {
    /// A fresh context with its own run id and token.
    pub fn new() -> Self {
        Self {
            run_id: generate_run_id(),
            cancel: CancellationToken::new(),
        }
    }

    /// Observe an existing token instead of a fresh one.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Set the run id.
    #[must_use]
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = run_id.into();
        self
    }

    /// Run id shared by every cycle of this call.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// The cancellation token.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Cancel the call.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the call has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn tool_context(&self, model: &str, iteration: u32) -> ToolContext {
        ToolContext::new(model)
            .with_run_id(&self.run_id)
            .with_iteration(iteration)
    }
}

enum Phase {
    Requesting,
    Assembling(ChatCompletionResponse),
    Done(ModelResponse),
}

/// Chat provider over any [`ChatCompletionClient`].
///
/// Construction never fails. The API key is checked on every call instead.
pub struct ChatProvider<C> {
    client: Arc<C>,
    pipe_capacity: usize,
}

impl<C> Clone for ChatProvider<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            pipe_capacity: self.pipe_capacity,
        }
    }
}

impl<C> std::fmt::Debug for ChatProvider<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatProvider")
            .field("pipe_capacity", &self.pipe_capacity)
            .finish_non_exhaustive()
    }
}

impl<C: ChatCompletionClient> ChatProvider<C> {
    /// Wrap a wire client.
    pub fn new(client: C) -> Self {
        Self::from_arc(Arc::new(client))
    }

    /// Wrap a shared wire client.
    pub fn from_arc(client: Arc<C>) -> Self {
        Self {
            client,
            pipe_capacity: DEFAULT_PIPE_CAPACITY,
        }
    }

    /// Set the capacity of the pipe used by [`new_stream`](Self::new_stream).
    #[must_use]
    pub fn with_pipe_capacity(mut self, capacity: usize) -> Self {
        self.pipe_capacity = capacity.max(1);
        self
    }

    /// The underlying wire client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Pipe capacity for streaming calls.
    pub fn pipe_capacity(&self) -> usize {
        self.pipe_capacity
    }

    /// Send `request` and keep cycling while the model calls tools.
    ///
    /// Runs at most `options.max_iterations` cycles. When the budget runs out
    /// the last response is returned as is, even if it still carries tool
    /// calls.
    pub async fn generate(
        &self,
        ctx: &RequestContext,
        request: &ModelRequest,
        options: ModelOptions,
    ) -> ModelResult<ModelResponse> {
        let mut params = self.prepare(request, &options)?;
        let mut remaining = options.max_iterations;
        let mut iteration = 0u32;
        let mut phase = Phase::Requesting;

        loop {
            phase = match phase {
                Phase::Requesting => {
                    iteration += 1;
                    remaining -= 1;
                    info!(
                        run_id = %ctx.run_id,
                        model = %params.model,
                        iteration,
                        message_count = params.messages.len(),
                        "ChatProvider: sending request"
                    );
                    let completion = tokio::select! {
                        biased;
                        _ = ctx.cancel.cancelled() => return Err(ModelError::Cancelled),
                        res = self.client.create(&params) => res?,
                    };
                    Phase::Assembling(completion)
                }
                Phase::Assembling(completion) => {
                    let tool_ctx = ctx.tool_context(&request.model, iteration);
                    let response =
                        choices_to_response(&tool_ctx, &mut params, &request.tools, &completion.choices)?;
                    if response.requires_followup() && remaining > 0 {
                        debug!(iteration, remaining, "ChatProvider: tool results ready, continuing");
                        Phase::Requesting
                    } else {
                        Phase::Done(response)
                    }
                }
                Phase::Done(response) => {
                    debug!(run_id = %ctx.run_id, iterations = iteration, "ChatProvider: done");
                    return Ok(response);
                }
            };
        }
    }

    /// Start a streaming call.
    ///
    /// Guards run before anything is spawned, so an invalid key, model or
    /// budget is reported here and not through the pipe. Must be called
    /// inside a tokio runtime.
    pub fn new_stream(
        &self,
        ctx: &RequestContext,
        request: &ModelRequest,
        options: ModelOptions,
    ) -> ModelResult<ResponseStream> {
        let params = self.prepare(request, &options)?;
        let cycle = StreamCycle {
            client: Arc::clone(&self.client),
            ctx: ctx.clone(),
            model: request.model.clone(),
            tools: request.tools.clone(),
            max_iterations: options.max_iterations,
        };

        debug!(run_id = %ctx.run_id, capacity = self.pipe_capacity, "ChatProvider: spawning stream producer");
        Ok(StreamPipe::go(self.pipe_capacity, move |tx| cycle.run(params, tx)))
    }

    fn prepare(&self, request: &ModelRequest, options: &ModelOptions) -> ModelResult<ChatCompletionRequest> {
        if !is_valid_api_key(self.client.api_key()) {
            return Err(ModelError::InvalidApiKey);
        }
        if !options.has_budget() {
            return Err(ModelError::TooManyIterations);
        }
        to_chat_completion_request(request, options)
    }
}

struct StreamCycle<C> {
    client: Arc<C>,
    ctx: RequestContext,
    model: String,
    tools: Vec<ToolDefinition>,
    max_iterations: i32,
}

impl<C: ChatCompletionClient> StreamCycle<C> {
    async fn run(
        self,
        mut params: ChatCompletionRequest,
        tx: PipeSender<ModelResponse, ModelError>,
    ) -> ModelResult<()> {
        info!(run_id = %self.ctx.run_id, "ChatProvider: stream task started");
        let mut remaining = self.max_iterations;
        let mut iteration = 0u32;

        loop {
            iteration += 1;
            remaining -= 1;
            info!(iteration, message_count = params.messages.len(), "ChatProvider: opening stream");

            let mut chunks = tokio::select! {
                biased;
                _ = self.ctx.cancel.cancelled() => return Err(ModelError::Cancelled),
                res = self.client.create_stream(&params) => res.map_err(|e| {
                    error!(error = %e, "ChatProvider: create_stream failed");
                    e
                })?,
            };

            let mut acc = ChatCompletionAccumulator::new();
            loop {
                let next = tokio::select! {
                    biased;
                    _ = self.ctx.cancel.cancelled() => return Err(ModelError::Cancelled),
                    next = chunks.next() => next,
                };
                let Some(chunk) = next else { break };
                let chunk = chunk?;
                acc.add_chunk(&chunk);

                let partial = chunk_choices_to_response(&chunk.choices);
                if partial.is_empty() {
                    continue;
                }
                if !tx.send(partial).await {
                    debug!("ChatProvider: consumer dropped, stopping");
                    return Ok(());
                }
            }
            info!(iteration, chunks = acc.chunk_count(), "ChatProvider: stream cycle finished");

            let tool_ctx = self.ctx.tool_context(&self.model, iteration);
            let completion = acc.completion();
            let response = choices_to_response(&tool_ctx, &mut params, &self.tools, &completion.choices)?;
            let followup = response.requires_followup() && remaining > 0;

            if !tx.send(response).await {
                debug!("ChatProvider: consumer dropped, stopping");
                return Ok(());
            }
            if !followup {
                return Ok(());
            }
            if self.ctx.is_cancelled() {
                return Err(ModelError::Cancelled);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockChatClient;
    use crate::types::{ChatCompletionChunk, ChunkChoice, ChunkDelta, ChunkFunction, ChunkToolCall};
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tongyi_core::{Message, Role, Status};

    fn request() -> ModelRequest {
        ModelRequest::new("qwen-plus").with_message(Message::user("What's the weather in Beijing?"))
    }

    fn weather_request(calls: Arc<AtomicUsize>) -> ModelRequest {
        request().with_tool(ToolDefinition::new("weather", move |_, _| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok("sunny".to_string())
        }))
    }

    fn tool_chunk() -> ChatCompletionChunk {
        tool_chunk_for("weather")
    }

    fn tool_chunk_for(name: &str) -> ChatCompletionChunk {
        ChatCompletionChunk {
            choices: vec![ChunkChoice {
                index: 0,
                delta: ChunkDelta {
                    tool_calls: Some(vec![ChunkToolCall {
                        index: 0,
                        id: Some("call_1".to_string()),
                        tool_type: Some("function".to_string()),
                        function: Some(ChunkFunction {
                            name: Some(name.to_string()),
                            arguments: Some("{}".to_string()),
                        }),
                    }]),
                    ..ChunkDelta::default()
                },
                finish_reason: Some("tool_calls".to_string()),
            }],
            ..ChatCompletionChunk::default()
        }
    }

    #[tokio::test]
    async fn test_single_cycle_without_tools() {
        let provider = ChatProvider::new(MockChatClient::new().with_text_response("Sunny, 25C"));
        let response = provider
            .generate(&RequestContext::new(), &request(), ModelOptions::new())
            .await
            .unwrap();

        assert_eq!(response.text(), "Sunny, 25C");
        let sent = provider.client().recorded_requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].messages.len(), 1);
    }

    #[tokio::test]
    async fn test_tool_cycle_then_answer() {
        let calls = Arc::new(AtomicUsize::new(0));
        let client = MockChatClient::new()
            .with_tool_call_response("call_1", "weather", r#"{"city":"Beijing"}"#)
            .with_text_response("It is sunny.");
        let provider = ChatProvider::new(client);

        let response = provider
            .generate(&RequestContext::new(), &weather_request(calls.clone()), ModelOptions::new())
            .await
            .unwrap();

        assert_eq!(response.text(), "It is sunny.");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let sent = provider.client().recorded_requests();
        assert_eq!(sent.len(), 2);
        // user, assistant announcement, tool result
        assert_eq!(sent[1].messages.len(), 3);
        assert_eq!(sent[1].messages[2].tool_call_id.as_deref(), Some("call_1"));
    }

    #[tokio::test]
    async fn test_budget_exhaustion_returns_last_response() {
        let calls = Arc::new(AtomicUsize::new(0));
        let client = MockChatClient::new()
            .with_tool_call_response("call_1", "weather", "{}")
            .with_tool_call_response("call_2", "weather", "{}")
            .with_tool_call_response("call_3", "weather", "{}");
        let provider = ChatProvider::new(client);

        let response = provider
            .generate(
                &RequestContext::new(),
                &weather_request(calls.clone()),
                ModelOptions::new().max_iterations(2),
            )
            .await
            .unwrap();

        assert_eq!(provider.client().request_count(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        let last = response.first().unwrap();
        assert_eq!(last.role, Role::Tool);
        assert_eq!(last.tool_calls[0].id, "call_2");
    }

    #[tokio::test]
    async fn test_guards_fire_before_network() {
        let provider = ChatProvider::new(MockChatClient::new());
        let ctx = RequestContext::new();

        let err = provider
            .generate(&ctx, &request(), ModelOptions::new().max_iterations(0))
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::TooManyIterations));

        let err = provider
            .new_stream(&ctx, &request(), ModelOptions::new().max_iterations(-1))
            .unwrap_err();
        assert!(matches!(err, ModelError::TooManyIterations));

        let err = provider
            .generate(&ctx, &ModelRequest::new("gpt-4o").with_message(Message::user("hi")), ModelOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidModel(_)));

        assert_eq!(provider.client().request_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_api_key_is_deferred() {
        let provider = ChatProvider::new(MockChatClient::new().with_api_key("short"));
        let err = provider
            .generate(&RequestContext::new(), &request(), ModelOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidApiKey));

        let err = provider
            .new_stream(&RequestContext::new(), &request(), ModelOptions::new())
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidApiKey));
        assert_eq!(provider.client().request_count(), 0);
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let provider = ChatProvider::new(MockChatClient::new().with_error(ModelError::http(503, "busy")));
        let err = provider
            .generate(&RequestContext::new(), &request(), ModelOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::Http { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_cancelled_before_send() {
        let provider = ChatProvider::new(MockChatClient::new());
        let ctx = RequestContext::new();
        ctx.cancel();

        let err = provider.generate(&ctx, &request(), ModelOptions::new()).await.unwrap_err();
        assert!(matches!(err, ModelError::Cancelled));
    }

    #[tokio::test]
    async fn test_stream_partials_then_final() {
        let provider = ChatProvider::new(MockChatClient::new().with_text_stream(&["It ", "is ", "sunny."]));
        let mut pipe = provider
            .new_stream(&RequestContext::new(), &request(), ModelOptions::new())
            .unwrap();

        let mut seen = Vec::new();
        while pipe.next().await {
            let msg = pipe.current().unwrap().first().unwrap();
            seen.push((msg.status, msg.text()));
        }

        assert!(pipe.error().is_none());
        assert_eq!(
            seen,
            vec![
                (Status::Incomplete, "It ".to_string()),
                (Status::Incomplete, "is ".to_string()),
                (Status::Incomplete, "sunny.".to_string()),
                (Status::Completed, "It is sunny.".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_stream_restarts_after_tool_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let client = MockChatClient::new()
            .with_stream(vec![Ok(tool_chunk())])
            .with_text_stream(&["Sunny."]);
        let provider = ChatProvider::new(client);

        let items = provider
            .new_stream(&RequestContext::new(), &weather_request(calls.clone()), ModelOptions::new())
            .unwrap()
            .collect_all()
            .await
            .unwrap();

        // tool delta, executed tool message, text delta, final text
        assert_eq!(items.len(), 4);
        assert_eq!(items[1].first().unwrap().role, Role::Tool);
        assert_eq!(items[1].first().unwrap().tool_calls[0].result, "sunny");
        assert_eq!(items[3].text(), "Sunny.");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.client().request_count(), 2);
    }

    #[tokio::test]
    async fn test_stream_error_terminates_pipe() {
        let client = MockChatClient::new().with_stream(vec![
            Ok(MockChatClient::text_chunk("partial")),
            Err(ModelError::Connection("reset".to_string())),
            Ok(MockChatClient::text_chunk("never")),
        ]);
        let provider = ChatProvider::new(client);
        let mut pipe = provider
            .new_stream(&RequestContext::new(), &request(), ModelOptions::new())
            .unwrap();

        assert!(pipe.next().await);
        assert_eq!(pipe.current().unwrap().text(), "partial");
        assert!(!pipe.next().await);
        assert!(matches!(pipe.error(), Some(ModelError::Connection(_))));
        assert!(!pipe.next().await);
    }

    #[tokio::test]
    async fn test_stream_usage_only_chunk_not_forwarded() {
        let client = MockChatClient::new().with_stream(vec![
            Ok(MockChatClient::text_chunk("Hi")),
            Ok(ChatCompletionChunk::default()),
        ]);
        let items = ChatProvider::new(client)
            .new_stream(&RequestContext::new(), &request(), ModelOptions::new())
            .unwrap()
            .collect_all()
            .await
            .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[1].first().unwrap().status, Status::Completed);
    }

    #[tokio::test]
    async fn test_stream_without_choices_is_empty_response() {
        let client = MockChatClient::new().with_stream(vec![Ok(ChatCompletionChunk::default())]);
        let err = ChatProvider::new(client)
            .new_stream(&RequestContext::new(), &request(), ModelOptions::new())
            .unwrap()
            .collect_all()
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_stream_cancelled() {
        let ctx = RequestContext::new();
        ctx.cancel();
        let err = ChatProvider::new(MockChatClient::new())
            .new_stream(&ctx, &request(), ModelOptions::new())
            .unwrap()
            .collect_all()
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::Cancelled));
    }

    #[tokio::test]
    async fn test_stream_stops_restarting_when_budget_runs_out() {
        let calls = Arc::new(AtomicUsize::new(0));
        let client = MockChatClient::new()
            .with_stream(vec![Ok(tool_chunk())])
            .with_stream(vec![Ok(tool_chunk())])
            .with_stream(vec![Ok(tool_chunk())]);
        let provider = ChatProvider::new(client);

        let items = provider
            .new_stream(
                &RequestContext::new(),
                &weather_request(calls.clone()),
                ModelOptions::new().max_iterations(2),
            )
            .unwrap()
            .collect_all()
            .await
            .unwrap();

        let shape: Vec<_> = items
            .iter()
            .map(|r| {
                let msg = r.first().unwrap();
                (msg.role, msg.status)
            })
            .collect();
        assert_eq!(
            shape,
            vec![
                (Role::Tool, Status::Incomplete),
                (Role::Tool, Status::Completed),
                (Role::Tool, Status::Incomplete),
                (Role::Tool, Status::Completed),
            ]
        );
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        let sent: Vec<_> = provider
            .client()
            .recorded_requests()
            .iter()
            .map(|r| r.messages.len())
            .collect();
        assert_eq!(sent, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_stream_unknown_tool_terminates_pipe() {
        let client = MockChatClient::new().with_stream(vec![Ok(tool_chunk_for("nope"))]);
        let provider = ChatProvider::new(client);
        let mut pipe = provider
            .new_stream(&RequestContext::new(), &request(), ModelOptions::new())
            .unwrap();

        assert!(pipe.next().await);
        assert_eq!(pipe.current().unwrap().first().unwrap().status, Status::Incomplete);
        assert!(!pipe.next().await);
        assert!(matches!(pipe.error(), Some(ModelError::ToolNotFound(name)) if name == "nope"));
        assert_eq!(provider.client().request_count(), 1);
    }
}
