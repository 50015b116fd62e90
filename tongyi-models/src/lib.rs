//! # tongyi-models
//!
//! Chat provider for Alibaba Cloud's Qwen models, spoken over DashScope's
//! OpenAI-compatible chat-completions endpoint.
//!
//! The crate is layered:
//!
//! - [`types`]: the wire schema
//! - [`translate`] and [`assemble`]: neutral messages to wire requests and back,
//!   including tool execution
//! - [`client`]: the [`ChatCompletionClient`] seam and its reqwest implementation
//! - [`provider`]: the [`ChatProvider`] that runs request/tool cycles, either
//!   to completion or as a stream
//!
//! ## Example
//!
//! ```rust,no_run
//! use tongyi_core::{Message, ModelOptions};
//! use tongyi_models::{ChatProvider, HttpChatClient, ModelRequest, RequestContext, QWEN_PLUS};
//!
//! # async fn run() -> Result<(), tongyi_models::ModelError> {
//! let provider = ChatProvider::new(HttpChatClient::new(std::env::var("DASHSCOPE_API_KEY").unwrap_or_default()));
//! let request = ModelRequest::new(QWEN_PLUS).with_message(Message::user("Hello!"));
//!
//! let response = provider
//!     .generate(&RequestContext::new(), &request, ModelOptions::new().temperature(0.7))
//!     .await?;
//! println!("{}", response.text());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod accumulator;
pub mod assemble;
pub mod client;
pub mod error;
pub mod mock;
pub mod models;
pub mod provider;
pub mod request;
pub mod translate;
pub mod types;

pub use accumulator::ChatCompletionAccumulator;
pub use assemble::{chunk_choices_to_response, choices_to_response};
pub use client::{ChatCompletionClient, ChunkStream, HttpChatClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
pub use error::{ModelError, ModelResult};
pub use mock::MockChatClient;
pub use models::{
    is_valid_api_key, is_valid_model, QWEN_AUDIO, QWEN_LONG, QWEN_MAX, QWEN_PLUS, QWEN_TURBO,
    QWEN_VL, SUPPORTED_MODELS,
};
pub use provider::{ChatProvider, RequestContext, ResponseStream};
pub use request::ModelRequest;
pub use translate::to_chat_completion_request;

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        ChatCompletionClient, ChatProvider, HttpChatClient, ModelError, ModelRequest, ModelResult,
        RequestContext,
    };
}
