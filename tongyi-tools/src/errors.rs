//! Tool-specific error types.

use thiserror::Error;

/// Errors that can occur during tool lookup and execution.
#[derive(Debug, Error)]
pub enum ToolError {
    /// No tool with the requested name.
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// Tool execution failed.
    #[error("Tool execution failed: {0}")]
    ExecutionFailed(String),

    /// The argument string did not match what the tool expects.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ToolError {
    /// Create a not found error.
    #[must_use]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create an execution failure.
    #[must_use]
    pub fn execution_failed(msg: impl Into<String>) -> Self {
        Self::ExecutionFailed(msg.into())
    }

    /// Create an invalid arguments error.
    #[must_use]
    pub fn invalid_args(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    /// Check if this is a lookup failure rather than a handler failure.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Result type for tool operations.
pub type ToolResult<T = String> = Result<T, ToolError>;
