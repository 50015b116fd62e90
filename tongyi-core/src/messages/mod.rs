//! Message types for model interactions.
//!
//! - **Content**: [`Part`] and its [`TextPart`], [`FilePart`], [`DataPart`] variants
//! - **Messages**: [`Message`] with [`Role`], [`Status`] and [`ToolCall`] records
//! - **Responses**: [`ModelResponse`]
//!
//! ## Example
//!
//! ```rust
//! use tongyi_core::messages::{Message, Part, Role};
//!
//! let msg = Message::user("What is in this picture?")
//!     .with_part(Part::file("https://example.com/cat.png", "image/png"));
//!
//! assert_eq!(msg.role, Role::User);
//! assert_eq!(msg.parts.len(), 2);
//! ```

pub mod message;
pub mod parts;
pub mod response;

pub use message::{Message, Role, Status, ToolCall};
pub use parts::{DataPart, FilePart, Part, TextPart};
pub use response::ModelResponse;
