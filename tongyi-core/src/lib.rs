//! # tongyi-core
//!
//! Core types, messages, and error handling for the tongyi chat adapter.
//!
//! This crate provides the vendor-neutral types shared by the rest of the
//! workspace:
//!
//! - **Messages**: [`Message`], its [`Part`]s and [`ToolCall`] records
//! - **Responses**: [`ModelResponse`]
//! - **Options**: [`ModelOptions`] sampling and iteration settings
//! - **Media**: [`MimeType`] classification for file and data parts
//! - **Errors**: [`CoreError`]
//!
//! ## Example
//!
//! ```rust
//! use tongyi_core::{Message, ModelOptions, Part};
//!
//! let message = Message::user("Describe this image.")
//!     .with_part(Part::data(vec![0x89, 0x50, 0x4E, 0x47], "image/png"));
//!
//! let options = ModelOptions::new().temperature(0.7).max_iterations(5);
//!
//! assert_eq!(message.parts.len(), 2);
//! assert_eq!(options.max_iterations, 5);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod errors;
pub mod identifier;
pub mod media;
pub mod messages;
pub mod settings;

pub use errors::{CoreError, Result};
pub use identifier::generate_run_id;
pub use media::{MediaKind, MimeType};
pub use messages::{
    DataPart, FilePart, Message, ModelResponse, Part, Role, Status, TextPart, ToolCall,
};
pub use settings::{ModelOptions, DEFAULT_MAX_ITERATIONS};

/// Prelude module for common imports.
///
/// ```rust
/// use tongyi_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::errors::{CoreError, Result};
    pub use crate::media::{MediaKind, MimeType};
    pub use crate::messages::{
        DataPart, FilePart, Message, ModelResponse, Part, Role, Status, TextPart, ToolCall,
    };
    pub use crate::settings::ModelOptions;
}
