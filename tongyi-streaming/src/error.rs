//! Streaming errors.

use thiserror::Error;

/// Errors that can occur while decoding or relaying a stream.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Malformed SSE framing.
    #[error("Failed to parse SSE event: {0}")]
    ParseSse(String),

    /// The underlying byte stream failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// An event grew past the buffer limit without a boundary.
    #[error("SSE buffer overflow")]
    BufferOverflow,
}

impl StreamError {
    /// Create a transport error from any displayable error.
    pub fn transport<E: std::fmt::Display>(err: E) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Result type for streaming operations.
pub type StreamResult<T> = Result<T, StreamError>;
