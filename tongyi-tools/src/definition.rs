//! Tool definitions: a name and schema the model sees, plus the handler that runs.

use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;

use crate::context::ToolContext;
use crate::errors::{ToolError, ToolResult};
use crate::schema::ObjectJsonSchema;

/// Synchronous tool handler. Receives the raw JSON argument string issued by
/// the model and returns the textual result sent back to it.
pub type ToolHandler = Arc<dyn Fn(&ToolContext, &str) -> ToolResult<String> + Send + Sync>;

/// A callable tool.
///
/// ```rust
/// use tongyi_tools::{SchemaBuilder, ToolDefinition};
///
/// let tool = ToolDefinition::new("echo", |_ctx, args| Ok(args.to_string()))
///     .with_description("Echo the arguments back")
///     .with_schema(SchemaBuilder::new().string("text", "Text to echo", true).build());
///
/// assert_eq!(tool.name, "echo");
/// assert!(tool.input_schema.is_some());
/// ```
#[derive(Clone)]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description for the model.
    pub description: Option<String>,
    /// Parameter schema.
    pub input_schema: Option<ObjectJsonSchema>,
    handler: ToolHandler,
}

impl ToolDefinition {
    /// Create a tool from a name and handler.
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&ToolContext, &str) -> ToolResult<String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: None,
            input_schema: None,
            handler: Arc::new(handler),
        }
    }

    /// Create a tool whose handler takes deserialized arguments.
    ///
    /// Argument strings that do not parse as `A` fail with
    /// [`ToolError::InvalidArguments`].
    pub fn typed<A, F>(name: impl Into<String>, handler: F) -> Self
    where
        A: DeserializeOwned,
        F: Fn(&ToolContext, A) -> ToolResult<String> + Send + Sync + 'static,
    {
        Self::new(name, move |ctx, raw| {
            let args: A = serde_json::from_str(raw).map_err(|e| ToolError::invalid_args(e.to_string()))?;
            handler(ctx, args)
        })
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Set the parameter schema.
    #[must_use]
    pub fn with_schema(mut self, schema: ObjectJsonSchema) -> Self {
        self.input_schema = Some(schema);
        self
    }

    /// Run the handler.
    pub fn call(&self, ctx: &ToolContext, arguments: &str) -> ToolResult<String> {
        (self.handler)(ctx, arguments)
    }
}

impl fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("input_schema", &self.input_schema)
            .finish_non_exhaustive()
    }
}
