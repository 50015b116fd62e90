//! Neutral request -> wire request translation.

use tongyi_core::{MediaKind, Message, ModelOptions, Part, Role};
use tongyi_tools::ToolDefinition;
use tracing::{debug, warn};

use crate::error::{ModelError, ModelResult};
use crate::models::is_valid_model;
use crate::request::ModelRequest;
use crate::types::{ChatCompletionRequest, ChatMessage, ChatTool, ContentPart, FunctionDefinition};

/// Build the wire request for `req`.
///
/// Fails with [`ModelError::InvalidModel`] or [`ModelError::EmptyMessages`]
/// before anything touches the network. Options are only copied when set.
pub fn to_chat_completion_request(
    req: &ModelRequest,
    opts: &ModelOptions,
) -> ModelResult<ChatCompletionRequest> {
    if !is_valid_model(&req.model) {
        return Err(ModelError::InvalidModel(req.model.clone()));
    }
    if req.messages.is_empty() {
        return Err(ModelError::EmptyMessages);
    }

    let mut params = ChatCompletionRequest::new(&req.model, Vec::with_capacity(req.messages.len()));
    params.tools = to_tools(&req.tools)?;

    if opts.top_p > 0.0 {
        params.top_p = Some(opts.top_p);
    }
    if opts.temperature > 0.0 {
        params.temperature = Some(opts.temperature);
    }
    if opts.max_output_tokens > 0 {
        params.max_completion_tokens = Some(opts.max_output_tokens);
    }
    if !opts.reasoning_effort.is_empty() {
        params.reasoning_effort = Some(opts.reasoning_effort.clone());
    }

    for msg in &req.messages {
        match msg.role {
            Role::User => params.messages.push(ChatMessage::user(to_content_parts(msg))),
            Role::Assistant => {
                if let Some(text) = msg.first_text() {
                    params.messages.push(ChatMessage::assistant(text));
                }
            }
            Role::System => params.messages.push(ChatMessage::system(to_text_parts(msg))),
            Role::Tool => {}
        }
    }

    debug!(
        model = %params.model,
        messages = params.messages.len(),
        tools = params.tools.as_ref().map_or(0, Vec::len),
        "Built chat completion request"
    );
    Ok(params)
}

/// Advertise tools to the model. An empty set yields `None`.
pub fn to_tools(tools: &[ToolDefinition]) -> ModelResult<Option<Vec<ChatTool>>> {
    if tools.is_empty() {
        return Ok(None);
    }

    tools
        .iter()
        .map(|tool| -> ModelResult<ChatTool> {
            let parameters = match &tool.input_schema {
                Some(schema) => {
                    let value = serde_json::to_value(schema)?;
                    Some(serde_json::from_value(value)?)
                }
                None => None,
            };
            Ok(ChatTool::function(FunctionDefinition {
                name: tool.name.clone(),
                description: tool.description.clone().filter(|d| !d.is_empty()),
                parameters,
            }))
        })
        .collect::<ModelResult<Vec<_>>>()
        .map(Some)
}

/// Text-only parts, used for system messages.
pub fn to_text_parts(message: &Message) -> Vec<ContentPart> {
    message
        .parts
        .iter()
        .filter_map(Part::as_text)
        .map(ContentPart::text)
        .collect()
}

/// Multi-modal parts, used for user messages.
///
/// File parts with a MIME kind other than image or audio cannot be expressed
/// and are dropped with a warning.
pub fn to_content_parts(message: &Message) -> Vec<ContentPart> {
    let mut parts = Vec::with_capacity(message.parts.len());
    for part in &message.parts {
        match part {
            Part::Text(t) => parts.push(ContentPart::text(&t.text)),
            Part::File(f) => match f.kind() {
                MediaKind::Image => parts.push(ContentPart::image_url(&f.uri)),
                MediaKind::Audio => {
                    parts.push(ContentPart::input_audio(&f.uri, f.mime_type.format()));
                }
                MediaKind::Other => {
                    warn!(mime_type = %f.mime_type, uri = %f.uri, "Dropping file part with unsupported MIME type");
                }
            },
            Part::Data(d) => match d.kind() {
                MediaKind::Image => parts.push(ContentPart::image_url(d.to_data_url())),
                MediaKind::Audio => parts.push(ContentPart::input_audio(
                    format!("data:;base64,{}", d.to_base64()),
                    d.mime_type.format(),
                )),
                MediaKind::Other => parts.push(ContentPart::file(d.to_base64(), &d.name)),
            },
        }
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MessageContent;
    use pretty_assertions::assert_eq;
    use tongyi_tools::SchemaBuilder;

    fn request(messages: Vec<Message>) -> ModelRequest {
        ModelRequest::new("qwen-plus").with_messages(messages)
    }

    fn parts_of(msg: &ChatMessage) -> &[ContentPart] {
        match &msg.content {
            Some(MessageContent::Parts(p)) => p,
            other => panic!("expected parts, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_model() {
        let req = ModelRequest::new("gpt-4o").with_message(Message::user("hi"));
        let err = to_chat_completion_request(&req, &ModelOptions::new()).unwrap_err();
        assert!(matches!(err, ModelError::InvalidModel(ref m) if m == "gpt-4o"));
    }

    #[test]
    fn test_empty_messages() {
        let err = to_chat_completion_request(&request(vec![]), &ModelOptions::new()).unwrap_err();
        assert!(matches!(err, ModelError::EmptyMessages));
    }

    #[test]
    fn test_options_copied_only_when_active() {
        let req = request(vec![Message::user("hi")]);

        let params = to_chat_completion_request(&req, &ModelOptions::new()).unwrap();
        assert_eq!(params.temperature, None);
        assert_eq!(params.top_p, None);
        assert_eq!(params.max_completion_tokens, None);
        assert_eq!(params.reasoning_effort, None);

        let opts = ModelOptions::new()
            .temperature(0.3)
            .top_p(0.8)
            .max_output_tokens(512)
            .reasoning_effort("high");
        let params = to_chat_completion_request(&req, &opts).unwrap();
        assert_eq!(params.temperature, Some(0.3));
        assert_eq!(params.top_p, Some(0.8));
        assert_eq!(params.max_completion_tokens, Some(512));
        assert_eq!(params.reasoning_effort.as_deref(), Some("high"));
    }

    #[test]
    fn test_roles() {
        let req = request(vec![
            Message::system("be brief").with_part(Part::file("https://x/a.png", "image/png")),
            Message::user("hello"),
            Message::assistant("first").with_part(Part::text("second")),
            Message::new(Role::Assistant).with_part(Part::file("https://x/a.png", "image/png")),
            Message::new(Role::Tool).with_part(Part::text("ignored")),
        ]);
        let params = to_chat_completion_request(&req, &ModelOptions::new()).unwrap();

        assert_eq!(params.messages.len(), 3);
        assert_eq!(params.messages[0].role, "system");
        assert_eq!(parts_of(&params.messages[0]), &[ContentPart::text("be brief")]);
        assert_eq!(params.messages[1].role, "user");
        assert_eq!(params.messages[2], ChatMessage::assistant("first"));
    }

    #[test]
    fn test_png_data_part() {
        let msg = Message::new(Role::User).with_part(Part::data(vec![0x89, 0x50, 0x4E, 0x47], "image/png"));
        let parts = to_content_parts(&msg);
        match &parts[0] {
            ContentPart::ImageUrl { image_url } => {
                assert!(image_url.url.starts_with("data:image/png;base64,"));
            }
            other => panic!("expected image part, got {other:?}"),
        }
    }

    #[test]
    fn test_file_parts() {
        let msg = Message::new(Role::User)
            .with_part(Part::file("https://x/cat.jpg", "image/jpeg"))
            .with_part(Part::file("https://x/clip.wav", "audio/wav"))
            .with_part(Part::file("https://x/doc.pdf", "application/pdf"));
        let parts = to_content_parts(&msg);

        assert_eq!(
            parts,
            vec![
                ContentPart::image_url("https://x/cat.jpg"),
                ContentPart::input_audio("https://x/clip.wav", "wav"),
            ]
        );
    }

    #[test]
    fn test_file_part_without_subtype() {
        let msg = Message::new(Role::User).with_part(Part::file("https://x/cat", "image"));
        assert_eq!(to_content_parts(&msg), vec![ContentPart::image_url("https://x/cat")]);
    }

    #[test]
    fn test_data_parts() {
        let msg = Message::new(Role::User)
            .with_part(Part::data(vec![1, 2, 3], "audio/mpeg"))
            .with_part(tongyi_core::DataPart::new(vec![1, 2, 3], "application/pdf").with_name("a.pdf"));
        let parts = to_content_parts(&msg);

        assert_eq!(
            parts,
            vec![
                ContentPart::input_audio("data:;base64,AQID", "mpeg"),
                ContentPart::file("AQID", "a.pdf"),
            ]
        );
    }

    #[test]
    fn test_to_tools() {
        assert_eq!(to_tools(&[]).unwrap(), None);

        let tools = vec![
            ToolDefinition::new("weather", |_, _| Ok(String::new()))
                .with_description("Get weather")
                .with_schema(SchemaBuilder::new().string("city", "City", true).build()),
            ToolDefinition::new("noop", |_, _| Ok(String::new())),
        ];
        let wire = to_tools(&tools).unwrap().unwrap();

        assert_eq!(wire.len(), 2);
        assert_eq!(wire[0].tool_type, "function");
        assert_eq!(wire[0].function.description.as_deref(), Some("Get weather"));
        let params = wire[0].function.parameters.as_ref().unwrap();
        assert_eq!(params["type"], "object");
        assert_eq!(params["required"][0], "city");
        assert!(wire[1].function.description.is_none());
        assert!(wire[1].function.parameters.is_none());
    }

    #[test]
    fn test_tools_advertised_on_request() {
        let req = request(vec![Message::user("hi")])
            .with_tool(ToolDefinition::new("noop", |_, _| Ok(String::new())));
        let params = to_chat_completion_request(&req, &ModelOptions::new()).unwrap();
        assert_eq!(params.tools.unwrap()[0].function.name, "noop");
    }
}
