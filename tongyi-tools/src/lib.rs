//! # tongyi-tools
//!
//! Tool definitions and execution for the tongyi chat adapter.
//!
//! ## Core Concepts
//!
//! - **[`ToolDefinition`]**: name, description, parameter schema and a
//!   synchronous handler
//! - **[`ToolContext`]**: per-chain context passed to every handler
//! - **[`invoke_tool`]**: look up a tool by name and run it
//! - **[`SchemaBuilder`]**: assemble [`ObjectJsonSchema`] parameter schemas
//!
//! ## Example
//!
//! ```rust
//! use tongyi_tools::{invoke_tool, SchemaBuilder, ToolContext, ToolDefinition};
//!
//! let weather = ToolDefinition::new("get_weather", |_ctx, args| {
//!     Ok(format!("Sunny, 22C ({args})"))
//! })
//! .with_description("Get current weather for a city")
//! .with_schema(SchemaBuilder::new().string("city", "City name", true).build());
//!
//! let ctx = ToolContext::new("qwen-plus");
//! let out = invoke_tool(&ctx, &[weather], "get_weather", r#"{"city":"Hangzhou"}"#).unwrap();
//! assert!(out.starts_with("Sunny"));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod context;
pub mod definition;
pub mod errors;
pub mod invoke;
pub mod schema;

pub use context::ToolContext;
pub use definition::{ToolDefinition, ToolHandler};
pub use errors::{ToolError, ToolResult};
pub use invoke::{find_tool, invoke_tool};
pub use schema::{ObjectJsonSchema, SchemaBuilder};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        invoke_tool, ObjectJsonSchema, SchemaBuilder, ToolContext, ToolDefinition, ToolError,
        ToolResult,
    };
}
