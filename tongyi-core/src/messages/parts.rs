//! Message content parts.
//!
//! A [`Part`] is exactly one of text, a file reference, or inline binary data.
//! File and data parts carry a [`MimeType`] that decides how they are encoded
//! on the wire.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use crate::media::{MediaKind, MimeType};

/// Plain text content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPart {
    /// The text content.
    pub text: String,
}

impl TextPart {
    /// Create a new text part.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Check if the text is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A file referenced by URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePart {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Location of the file. Passed through verbatim.
    pub uri: String,
    /// MIME type of the file.
    pub mime_type: MimeType,
}

impl FilePart {
    /// Create a new file part.
    #[must_use]
    pub fn new(uri: impl Into<String>, mime_type: impl Into<MimeType>) -> Self {
        Self {
            name: String::new(),
            uri: uri.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Media classification of this file.
    #[must_use]
    pub fn kind(&self) -> MediaKind {
        self.mime_type.kind()
    }
}

/// Inline binary content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPart {
    /// Display name, used as the filename for generic file uploads.
    #[serde(default)]
    pub name: String,
    /// Raw bytes, base64 encoded when serialized.
    #[serde(with = "base64_serde")]
    pub bytes: Vec<u8>,
    /// MIME type of the data.
    pub mime_type: MimeType,
}

impl DataPart {
    /// Create a new data part.
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>, mime_type: impl Into<MimeType>) -> Self {
        Self {
            name: String::new(),
            bytes: bytes.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Media classification of this data.
    #[must_use]
    pub fn kind(&self) -> MediaKind {
        self.mime_type.kind()
    }

    /// The bytes as standard base64.
    #[must_use]
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// The bytes as a `data:<mime>;base64,<payload>` URL.
    #[must_use]
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

/// One unit of message content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Part {
    /// Text content.
    Text(TextPart),
    /// File reference.
    File(FilePart),
    /// Inline binary data.
    Data(DataPart),
}

impl Part {
    /// Create a text part.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(TextPart::new(text))
    }

    /// Create a file part.
    #[must_use]
    pub fn file(uri: impl Into<String>, mime_type: impl Into<MimeType>) -> Self {
        Self::File(FilePart::new(uri, mime_type))
    }

    /// Create a data part.
    #[must_use]
    pub fn data(bytes: impl Into<Vec<u8>>, mime_type: impl Into<MimeType>) -> Self {
        Self::Data(DataPart::new(bytes, mime_type))
    }

    /// Get the text if this is a text part.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(&t.text),
            _ => None,
        }
    }
}

impl From<TextPart> for Part {
    fn from(p: TextPart) -> Self {
        Self::Text(p)
    }
}

impl From<FilePart> for Part {
    fn from(p: FilePart) -> Self {
        Self::File(p)
    }
}

impl From<DataPart> for Part {
    fn from(p: DataPart) -> Self {
        Self::Data(p)
    }
}

mod base64_serde {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_data_url() {
        let part = DataPart::new(vec![0x89, 0x50, 0x4E, 0x47], "image/png");
        assert_eq!(part.kind(), MediaKind::Image);
        assert_eq!(part.to_data_url(), "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn test_as_text() {
        assert_eq!(Part::text("hi").as_text(), Some("hi"));
        assert_eq!(Part::file("https://x/a.wav", "audio/wav").as_text(), None);
    }

    #[test]
    fn test_part_serializes_with_kind_tag() {
        let json = serde_json::to_value(Part::data(vec![1, 2, 3], "application/pdf")).unwrap();
        assert_eq!(json["kind"], "data");
        assert_eq!(json["bytes"], "AQID");
        assert_eq!(json["mime_type"], "application/pdf");
    }

    #[test]
    fn test_file_with_name() {
        let part = FilePart::new("https://x/a.png", "image/png").with_name("a.png");
        assert_eq!(part.name, "a.png");
        assert_eq!(part.kind(), MediaKind::Image);
    }
}
