//! # tongyi-streaming
//!
//! Streaming support for tongyi.
//!
//! - **[`SseParser`]** / **[`SseStream`]**: decode Server-Sent Events from an
//!   HTTP byte stream
//! - **[`StreamPipe`]**: bounded single-producer pipe with a cursor API and a
//!   [`futures::Stream`] implementation
//!
//! ## Example - SSE Parsing
//!
//! ```rust
//! use tongyi_streaming::SseParser;
//!
//! let mut parser = SseParser::new();
//! parser.feed_str("data: {\"content\": \"hello\"}\n\ndata: [DONE]\n\n").unwrap();
//!
//! let first = parser.next_event().unwrap();
//! assert_eq!(first.data, "{\"content\": \"hello\"}");
//! assert!(parser.next_event().unwrap().is_done());
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod pipe;
pub mod sse;

pub use error::{StreamError, StreamResult};
pub use pipe::{PipeSender, StreamPipe, DEFAULT_PIPE_CAPACITY};
pub use sse::{SseEvent, SseParser, SseStream};
