//! # tongyi - Qwen chat completions for Rust
//!
//! A typed client for Alibaba Cloud's Qwen models, spoken over DashScope's
//! OpenAI-compatible endpoint. Requests are built from provider-neutral
//! messages; tool calls issued by the model are executed locally and fed back
//! until the model answers or the iteration budget runs out.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tongyi::prelude::*;
//!
//! # async fn run() -> Result<(), ModelError> {
//! let provider = ProviderConfig::from_env().build();
//! let request = ModelRequest::new(QWEN_PLUS)
//!     .with_message(Message::system("You are a helpful assistant."))
//!     .with_message(Message::user("What is the capital of France?"));
//!
//! let response = provider
//!     .generate(&RequestContext::new(), &request, ModelOptions::new())
//!     .await?;
//! println!("{}", response.text());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`tongyi_core`] - messages, parts, MIME kinds and options
//! - [`tongyi_tools`] - tool definitions, schemas and invocation
//! - [`tongyi_streaming`] - SSE decoding and the producer/consumer pipe
//! - [`tongyi_models`] - wire types, translation and the chat provider
//!
//! ## Streaming
//!
//! ```no_run
//! use tongyi::prelude::*;
//!
//! # async fn run() -> Result<(), ModelError> {
//! let provider = ProviderConfig::from_env().build();
//! let request = ModelRequest::new(QWEN_TURBO).with_message(Message::user("Tell me a story"));
//!
//! let mut pipe = provider.new_stream(&RequestContext::new(), &request, ModelOptions::new())?;
//! while pipe.next().await {
//!     if let Some(response) = pipe.current() {
//!         print!("{}", response.text());
//!     }
//! }
//! if let Some(err) = pipe.error() {
//!     eprintln!("stream failed: {err}");
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;

pub use tongyi_core as core;
pub use tongyi_models as models;
pub use tongyi_streaming as streaming;
pub use tongyi_tools as tools;

pub use config::ProviderConfig;

// Core
pub use tongyi_core::{
    DataPart, FilePart, MediaKind, Message, MimeType, ModelOptions, ModelResponse, Part, Role,
    Status, TextPart, ToolCall,
};

// Models
pub use tongyi_models::{
    ChatCompletionClient, ChatProvider, HttpChatClient, ModelError, ModelRequest, ModelResult,
    RequestContext, ResponseStream, QWEN_AUDIO, QWEN_LONG, QWEN_MAX, QWEN_PLUS, QWEN_TURBO,
    QWEN_VL,
};

// Tools
pub use tongyi_tools::{ObjectJsonSchema, SchemaBuilder, ToolContext, ToolDefinition, ToolError, ToolResult};

// Streaming
pub use tongyi_streaming::StreamPipe;

/// Convenient prelude for common imports.
///
/// ```
/// use tongyi::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::ProviderConfig;
    pub use crate::core::{Message, ModelOptions, ModelResponse, Part, Role, Status};
    pub use crate::models::{
        ChatProvider, ModelError, ModelRequest, RequestContext, QWEN_MAX, QWEN_PLUS, QWEN_TURBO,
    };
    pub use crate::tools::{SchemaBuilder, ToolContext, ToolDefinition, ToolError, ToolResult};
}

/// Returns the current version of tongyi.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(version(), "0.1.0");
    }

    #[test]
    fn test_prelude_builds_request() {
        use crate::prelude::*;

        let request = ModelRequest::new(QWEN_PLUS).with_message(Message::user("hi"));
        assert_eq!(request.messages[0].role, Role::User);
    }
}
