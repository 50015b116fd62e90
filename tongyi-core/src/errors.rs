//! Error types for tongyi-core.

use thiserror::Error;

/// Errors raised by the core message types.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A MIME type string could not be parsed.
    #[error("Invalid MIME type: {0}")]
    InvalidMimeType(String),
}

/// Result type alias using CoreError.
pub type Result<T> = std::result::Result<T, CoreError>;
