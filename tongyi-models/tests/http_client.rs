use std::time::Duration;

use serde_json::json;
use tongyi_core::{Message, ModelOptions, Role, Status};
use tongyi_models::{
    ChatProvider, HttpChatClient, ModelError, ModelRequest, RequestContext, QWEN_PLUS,
};
use tongyi_tools::{SchemaBuilder, ToolDefinition};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "sk-test-0123456789abcdefghij";
const BEARER: &str = "Bearer sk-test-0123456789abcdefghij";

async fn setup() -> (MockServer, ChatProvider<HttpChatClient>) {
    let server = MockServer::start().await;
    let client = HttpChatClient::new(API_KEY).with_base_url(server.uri());
    (server, ChatProvider::new(client))
}

fn request() -> ModelRequest {
    ModelRequest::new(QWEN_PLUS)
        .with_message(Message::system("You are a helpful assistant."))
        .with_message(Message::user("Hello?"))
}

fn sse_body(events: &[serde_json::Value]) -> String {
    let mut body = String::new();
    for event in events {
        body.push_str(&format!("data: {event}\n\n"));
    }
    body.push_str("data: [DONE]\n\n");
    body
}

#[tokio::test]
async fn test_generate_basic() {
    let (server, provider) = setup().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", BEARER))
        .and(body_partial_json(json!({"model": "qwen-plus"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "created": 1_700_000_000,
            "model": "qwen-plus",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "Hello! How can I assist you today?",
                    "tool_calls": null
                },
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 15, "total_tokens": 27}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = provider
        .generate(&RequestContext::new(), &request(), ModelOptions::new())
        .await
        .unwrap();

    let msg = response.first().unwrap();
    assert_eq!(msg.role, Role::Assistant);
    assert_eq!(msg.text(), "Hello! How can I assist you today?");
}

#[tokio::test]
async fn test_generate_with_tool_round_trip() {
    let (server, provider) = setup().await;

    // Second cycle: the request carries the tool result.
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "messages": [{}, {}, {"role": "assistant"}, {"role": "tool", "tool_call_id": "call_abc"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Beijing is sunny."},
                "finish_reason": "stop"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "",
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": {"name": "weather", "arguments": "{\"city\":\"Beijing\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let weather = ToolDefinition::new("weather", |_, args| Ok(format!("sunny ({args})")))
        .with_description("Current weather for a city")
        .with_schema(SchemaBuilder::new().string("city", "City name", true).build());

    let response = provider
        .generate(&RequestContext::new(), &request().with_tool(weather), ModelOptions::new())
        .await
        .unwrap();

    assert_eq!(response.text(), "Beijing is sunny.");
}

#[tokio::test]
async fn test_stream_partials_and_final() {
    let (server, provider) = setup().await;
    let body = sse_body(&[
        json!({"id": "c1", "choices": [{"index": 0, "delta": {"role": "assistant", "content": "Hel"}}]}),
        json!({"id": "c1", "choices": [{"index": 0, "delta": {"content": "lo"}}]}),
        json!({"id": "c1", "choices": [{"index": 0, "delta": {"content": "!"}, "finish_reason": "stop"}]}),
        json!({"id": "c1", "choices": [], "usage": {"prompt_tokens": 5, "completion_tokens": 3, "total_tokens": 8}}),
    ]);

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"stream": true, "stream_options": {"include_usage": true}})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let items = provider
        .new_stream(&RequestContext::new(), &request(), ModelOptions::new())
        .unwrap()
        .collect_all()
        .await
        .unwrap();

    assert_eq!(items.len(), 4);
    for partial in &items[..3] {
        assert_eq!(partial.first().unwrap().status, Status::Incomplete);
    }
    let last = items[3].first().unwrap();
    assert_eq!(last.status, Status::Completed);
    assert_eq!(last.text(), "Hello!");
    assert_eq!(last.metadata.get("finish_reason").map(String::as_str), Some("stop"));
}

#[tokio::test]
async fn test_unauthorized_maps_to_authentication() {
    let (server, provider) = setup().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {
                "message": "Incorrect API key provided.",
                "type": "invalid_request_error",
                "code": "invalid_api_key"
            }
        })))
        .mount(&server)
        .await;

    let err = provider
        .generate(&RequestContext::new(), &request(), ModelOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ModelError::Authentication(ref m) if m.contains("Incorrect API key")));
}

#[tokio::test]
async fn test_vendor_error_body_maps_to_api() {
    let (server, provider) = setup().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"message": "Range of input length should be [1, 30720]", "code": "invalid_parameter_error"}
        })))
        .mount(&server)
        .await;

    let err = provider
        .new_stream(&RequestContext::new(), &request(), ModelOptions::new())
        .unwrap()
        .collect_all()
        .await
        .unwrap_err();
    match err {
        ModelError::Api { code, .. } => assert_eq!(code.as_deref(), Some("invalid_parameter_error")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_plain_server_error_maps_to_http() {
    let (server, provider) = setup().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let err = provider
        .generate(&RequestContext::new(), &request(), ModelOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ModelError::Http { status: 503, .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_timeout_reports_configured_duration() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"choices": []}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let client = HttpChatClient::new(API_KEY)
        .with_base_url(server.uri())
        .with_timeout(Duration::from_millis(200));
    let err = ChatProvider::new(client)
        .generate(&RequestContext::new(), &request(), ModelOptions::new())
        .await
        .unwrap_err();

    match err {
        ModelError::Timeout(after) => assert_eq!(after, Duration::from_millis(200)),
        other => panic!("unexpected error: {other:?}"),
    }
}
