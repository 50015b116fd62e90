//! Context passed to tool handlers.

use chrono::{DateTime, Utc};
use tongyi_core::identifier::generate_run_id;

/// Context passed to tools during execution.
///
/// One context is created per call chain; every cycle of the chain shares the
/// same `run_id`, and the invoker fills in `tool_name` and `tool_call_id`
/// before each handler runs.
///
/// ```rust
/// use tongyi_tools::ToolContext;
///
/// let ctx = ToolContext::new("qwen-plus").for_call("get_weather", "call_1");
/// assert_eq!(ctx.tool_name.as_deref(), Some("get_weather"));
/// assert!(ctx.run_id.starts_with("run_"));
/// ```
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Unique identifier for this call chain.
    pub run_id: String,

    /// When the chain started.
    pub start_time: DateTime<Utc>,

    /// Name of the model being used.
    pub model_name: String,

    /// Name of the tool being called (if in a tool call).
    pub tool_name: Option<String>,

    /// Tool call ID (if in a tool call).
    pub tool_call_id: Option<String>,

    /// Zero-based request cycle the call belongs to.
    pub iteration: u32,
}

impl ToolContext {
    /// Create a new context.
    #[must_use]
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            run_id: generate_run_id(),
            start_time: Utc::now(),
            model_name: model_name.into(),
            tool_name: None,
            tool_call_id: None,
            iteration: 0,
        }
    }

    /// Set the run ID.
    #[must_use]
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = run_id.into();
        self
    }

    /// Set the cycle number.
    #[must_use]
    pub fn with_iteration(mut self, iteration: u32) -> Self {
        self.iteration = iteration;
        self
    }

    /// Derive a context for one specific tool call.
    #[must_use]
    pub fn for_call(&self, tool_name: impl Into<String>, tool_call_id: impl Into<String>) -> Self {
        Self {
            tool_name: Some(tool_name.into()),
            tool_call_id: Some(tool_call_id.into()),
            ..self.clone()
        }
    }

    /// Time elapsed since the chain started.
    #[must_use]
    pub fn elapsed(&self) -> chrono::Duration {
        Utc::now() - self.start_time
    }
}
