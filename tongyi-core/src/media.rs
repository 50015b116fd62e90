//! MIME type handling for file and data parts.
//!
//! Outbound encoding is selected by the top-level MIME type, so the only
//! classification the adapter needs is [`MediaKind`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

/// Top-level media classification of a MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// `image/*`
    Image,
    /// `audio/*`
    Audio,
    /// Anything else.
    Other,
}

/// A MIME type string such as `image/png` or `audio/wav`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MimeType(String);

impl MimeType {
    /// Create a MIME type without validation.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the raw string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn parsed(&self) -> Option<mime::Mime> {
        self.0.parse::<mime::Mime>().ok()
    }

    /// Classify by top-level type.
    ///
    /// Values the `mime` crate rejects, such as a bare `image`, are
    /// classified on the text before the first `/`.
    #[must_use]
    pub fn kind(&self) -> MediaKind {
        let top = match self.parsed() {
            Some(m) => m.type_().as_str().to_ascii_lowercase(),
            None => self.0.split('/').next().unwrap_or_default().trim().to_ascii_lowercase(),
        };
        match top.as_str() {
            "image" => MediaKind::Image,
            "audio" => MediaKind::Audio,
            _ => MediaKind::Other,
        }
    }

    /// The subtype, used as the wire audio format (`audio/wav` -> `wav`).
    ///
    /// Falls back to the text after the first `/`, or an empty string.
    #[must_use]
    pub fn format(&self) -> String {
        match self.parsed() {
            Some(m) => m.subtype().as_str().to_ascii_lowercase(),
            None => self
                .0
                .split_once('/')
                .map(|(_, sub)| sub.trim().to_ascii_lowercase())
                .unwrap_or_default(),
        }
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MimeType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<mime::Mime>()
            .map(|_| Self(s.to_string()))
            .map_err(|_| CoreError::InvalidMimeType(s.to_string()))
    }
}

impl From<&str> for MimeType {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for MimeType {
    fn from(s: String) -> Self {
        Self(s)
    }
}
