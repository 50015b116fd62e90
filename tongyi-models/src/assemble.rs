//! Wire choices -> neutral responses, including tool execution.

use base64::{engine::general_purpose::STANDARD, Engine};
use tongyi_core::{DataPart, Message, ModelResponse, Part, Role, Status, ToolCall};
use tongyi_tools::{invoke_tool, ToolContext, ToolDefinition};
use tracing::debug;

use crate::error::{ModelError, ModelResult};
use crate::types::{ChatChoice, ChatCompletionRequest, ChatMessage, ChunkChoice};

/// Metadata key for a refusal.
pub const METADATA_REFUSAL: &str = "refusal";
/// Metadata key for the finish reason.
pub const METADATA_FINISH_REASON: &str = "finish_reason";

/// MIME type attached to decoded response audio.
const RESPONSE_AUDIO_MIME: &str = "audio/wav";

/// Convert completed choices into a response, executing any tool calls.
///
/// For every choice that carries tool calls, the assistant announcement and
/// one `tool` message per executed call are appended to `params`, so the
/// request is ready for the next cycle. Any tool failure aborts the whole
/// assembly.
pub fn choices_to_response(
    ctx: &ToolContext,
    params: &mut ChatCompletionRequest,
    tools: &[ToolDefinition],
    choices: &[ChatChoice],
) -> ModelResult<ModelResponse> {
    if choices.is_empty() {
        return Err(ModelError::EmptyResponse);
    }

    let mut res = ModelResponse::new();
    for choice in choices {
        let message = &choice.message;
        let mut msg = Message::new(Role::Assistant).with_status(Status::Completed);

        if let Some(content) = message.content.as_deref().filter(|c| !c.is_empty()) {
            msg = msg.with_part(Part::text(content));
        }
        if let Some(audio) = message.audio.as_ref().filter(|a| !a.data.is_empty()) {
            let bytes = STANDARD.decode(&audio.data)?;
            msg = msg.with_part(DataPart::new(bytes, RESPONSE_AUDIO_MIME).with_name(&audio.id));
        }
        msg = with_choice_metadata(msg, message.refusal.as_deref(), choice.finish_reason.as_deref());

        let calls = message.tool_calls();
        if !calls.is_empty() {
            params.messages.push(message.to_param());
        }
        for call in calls {
            let call_ctx = ctx.for_call(&call.function.name, &call.id);
            let result = invoke_tool(&call_ctx, tools, &call.function.name, &call.function.arguments)?;
            debug!(tool = %call.function.name, call_id = %call.id, "Tool call completed");

            msg.role = Role::Tool;
            msg.tool_calls.push(
                ToolCall::new(&call.id, &call.function.name, &call.function.arguments)
                    .with_result(&result),
            );
            params.messages.push(ChatMessage::tool(&call.id, result));
        }
        res.messages.push(msg);
    }
    Ok(res)
}

/// Convert one streamed chunk into a partial response. Nothing is executed.
pub fn chunk_choices_to_response(choices: &[ChunkChoice]) -> ModelResponse {
    let messages = choices
        .iter()
        .map(|choice| {
            let delta = &choice.delta;
            let mut msg = Message::new(Role::Assistant).with_status(Status::Incomplete);

            if let Some(content) = delta.content.as_deref().filter(|c| !c.is_empty()) {
                msg = msg.with_part(Part::text(content));
            }
            msg = with_choice_metadata(msg, delta.refusal.as_deref(), choice.finish_reason.as_deref());

            for call in delta.tool_calls.iter().flatten() {
                let function = call.function.clone().unwrap_or_default();
                msg.role = Role::Tool;
                msg.tool_calls.push(ToolCall::new(
                    call.id.clone().unwrap_or_default(),
                    function.name.unwrap_or_default(),
                    function.arguments.unwrap_or_default(),
                ));
            }
            msg
        })
        .collect();
    ModelResponse::with_messages(messages)
}

fn with_choice_metadata(msg: Message, refusal: Option<&str>, finish_reason: Option<&str>) -> Message {
    let mut msg = msg;
    if let Some(refusal) = refusal.filter(|r| !r.is_empty()) {
        msg = msg.with_metadata(METADATA_REFUSAL, refusal);
    }
    if let Some(reason) = finish_reason.filter(|r| !r.is_empty()) {
        msg = msg.with_metadata(METADATA_FINISH_REASON, reason);
    }
    msg
}
