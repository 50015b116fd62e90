//! Merge streamed chunks into a complete response.

use crate::types::{
    ChatChoice, ChatCompletionChunk, ChatCompletionResponse, ResponseMessage, ToolCall, Usage,
};

#[derive(Debug, Default)]
struct ChoiceState {
    index: u32,
    role: Option<String>,
    content: String,
    refusal: String,
    finish_reason: Option<String>,
    tool_calls: Vec<(u32, ToolCall)>,
}

impl ChoiceState {
    fn tool_call_mut(&mut self, index: u32) -> &mut ToolCall {
        let pos = match self.tool_calls.iter().position(|(i, _)| *i == index) {
            Some(pos) => pos,
            None => {
                self.tool_calls
                    .push((index, ToolCall::function(String::new(), String::new(), String::new())));
                self.tool_calls.len() - 1
            }
        };
        &mut self.tool_calls[pos].1
    }

    fn build(&self) -> ChatChoice {
        let non_empty = |s: &String| (!s.is_empty()).then(|| s.clone());
        let tool_calls: Vec<ToolCall> = self.tool_calls.iter().map(|(_, c)| c.clone()).collect();

        let mut message = ResponseMessage {
            content: non_empty(&self.content),
            refusal: non_empty(&self.refusal),
            tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
            ..ResponseMessage::default()
        };
        if let Some(role) = &self.role {
            message.role.clone_from(role);
        }

        ChatChoice {
            index: self.index,
            message,
            finish_reason: self.finish_reason.clone(),
        }
    }
}

/// Accumulates [`ChatCompletionChunk`]s into a [`ChatCompletionResponse`].
///
/// Choices are merged by choice index. Within a choice, tool-call deltas are
/// merged by tool index: id, name and type are set when present and argument
/// fragments are concatenated in arrival order.
#[derive(Debug, Default)]
pub struct ChatCompletionAccumulator {
    id: String,
    model: String,
    created: u64,
    choices: Vec<ChoiceState>,
    usage: Option<Usage>,
    chunks: usize,
}

impl ChatCompletionAccumulator {
    /// Create an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one chunk.
    pub fn add_chunk(&mut self, chunk: &ChatCompletionChunk) {
        self.chunks += 1;
        if self.id.is_empty() {
            self.id.clone_from(&chunk.id);
        }
        if self.model.is_empty() {
            self.model.clone_from(&chunk.model);
        }
        if self.created == 0 {
            self.created = chunk.created;
        }
        if chunk.usage.is_some() {
            self.usage.clone_from(&chunk.usage);
        }

        for choice in &chunk.choices {
            let state = self.choice_mut(choice.index);
            let delta = &choice.delta;

            if let Some(role) = delta.role.as_ref().filter(|r| !r.is_empty()) {
                state.role = Some(role.clone());
            }
            if let Some(content) = &delta.content {
                state.content.push_str(content);
            }
            if let Some(refusal) = &delta.refusal {
                state.refusal.push_str(refusal);
            }
            if let Some(reason) = choice.finish_reason.as_ref().filter(|r| !r.is_empty()) {
                state.finish_reason = Some(reason.clone());
            }

            for call in delta.tool_calls.iter().flatten() {
                let acc = state.tool_call_mut(call.index);
                if let Some(id) = call.id.as_ref().filter(|id| !id.is_empty()) {
                    acc.id.clone_from(id);
                }
                if let Some(ty) = call.tool_type.as_ref().filter(|t| !t.is_empty()) {
                    acc.tool_type.clone_from(ty);
                }
                if let Some(function) = &call.function {
                    if let Some(name) = function.name.as_ref().filter(|n| !n.is_empty()) {
                        acc.function.name.clone_from(name);
                    }
                    if let Some(args) = &function.arguments {
                        acc.function.arguments.push_str(args);
                    }
                }
            }
        }
    }

    /// Number of chunks merged so far.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks
    }

    /// The completion assembled so far.
    #[must_use]
    pub fn completion(&self) -> ChatCompletionResponse {
        ChatCompletionResponse {
            id: self.id.clone(),
            object: "chat.completion".to_string(),
            created: self.created,
            model: self.model.clone(),
            choices: self.choices.iter().map(ChoiceState::build).collect(),
            usage: self.usage.clone(),
        }
    }

    fn choice_mut(&mut self, index: u32) -> &mut ChoiceState {
        let pos = match self.choices.iter().position(|c| c.index == index) {
            Some(pos) => pos,
            None => {
                self.choices.push(ChoiceState {
                    index,
                    ..ChoiceState::default()
                });
                self.choices.len() - 1
            }
        };
        &mut self.choices[pos]
    }
}
