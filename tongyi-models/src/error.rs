//! Model-related error types.

use std::time::Duration;
use thiserror::Error;
use tongyi_streaming::StreamError;
use tongyi_tools::ToolError;

/// Errors produced by the chat provider.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The model id is not one of the supported Qwen models.
    #[error("Invalid model name: {0}")]
    InvalidModel(String),

    /// The request carried no messages.
    #[error("At least one message is required")]
    EmptyMessages,

    /// The API key is missing or malformed.
    #[error("Invalid or missing API key")]
    InvalidApiKey,

    /// The model called a tool that is not registered.
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// A tool handler failed.
    #[error("Tool error: {0}")]
    Tool(ToolError),

    /// The iteration budget was below one.
    #[error("Too many iterations requested")]
    TooManyIterations,

    /// The vendor returned no choices.
    #[error("Empty completion response")]
    EmptyResponse,

    /// HTTP error from the API.
    #[error("HTTP error: {status} - {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// API-level error decoded from the vendor error body.
    #[error("API error: {message}")]
    Api {
        /// Error message.
        message: String,
        /// Error code.
        code: Option<String>,
    },

    /// Authentication rejected by the API.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Request timeout.
    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    /// Base64 payload could not be decoded.
    #[error("Decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// SSE framing or stream transport error.
    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    /// The request was cancelled.
    #[error("Request cancelled")]
    Cancelled,
}

impl ModelError {
    /// Create an HTTP error.
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    /// Create an API error.
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
            code: None,
        }
    }

    /// Create an API error with code.
    pub fn api_with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
            code: Some(code.into()),
        }
    }

    /// Create an authentication error.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Authentication(message.into())
    }

    /// Check if this error is worth retrying at the transport level.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Connection(_) => true,
            Self::Http { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<ToolError> for ModelError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::NotFound(name) => Self::ToolNotFound(name),
            other => Self::Tool(other),
        }
    }
}

impl From<reqwest::Error> for ModelError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ModelError::Timeout(Duration::from_secs(crate::client::DEFAULT_TIMEOUT_SECS))
        } else if err.is_connect() {
            ModelError::Connection(err.to_string())
        } else if let Some(status) = err.status() {
            ModelError::http(status.as_u16(), err.to_string())
        } else if err.is_decode() {
            ModelError::Stream(StreamError::transport(err))
        } else {
            ModelError::Connection(err.to_string())
        }
    }
}

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;
