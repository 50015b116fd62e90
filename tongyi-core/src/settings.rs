//! Per-call model options.
//!
//! Zero or empty values mean "not set": only active options reach the wire.

use serde::{Deserialize, Serialize};

/// Default request/response/tool cycle budget.
pub const DEFAULT_MAX_ITERATIONS: i32 = 3;

fn default_max_iterations() -> i32 {
    DEFAULT_MAX_ITERATIONS
}

/// Options for one generate or stream call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelOptions {
    /// Sampling temperature. Sent only when greater than zero.
    #[serde(default)]
    pub temperature: f64,

    /// Top-p (nucleus) sampling. Sent only when greater than zero.
    #[serde(default)]
    pub top_p: f64,

    /// Maximum output tokens, sent as `max_completion_tokens`.
    #[serde(default)]
    pub max_output_tokens: u64,

    /// Reasoning effort, passed through verbatim when non-empty.
    #[serde(default)]
    pub reasoning_effort: String,

    /// Maximum number of request cycles. Values below 1 are rejected.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: i32,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            top_p: 0.0,
            max_output_tokens: 0,
            reasoning_effort: String::new(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl ModelOptions {
    /// Create options with the default iteration budget.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set temperature.
    #[must_use]
    pub fn temperature(mut self, temp: f64) -> Self {
        self.temperature = temp;
        self
    }

    /// Set top-p.
    #[must_use]
    pub fn top_p(mut self, p: f64) -> Self {
        self.top_p = p;
        self
    }

    /// Set max output tokens.
    #[must_use]
    pub fn max_output_tokens(mut self, tokens: u64) -> Self {
        self.max_output_tokens = tokens;
        self
    }

    /// Set reasoning effort.
    #[must_use]
    pub fn reasoning_effort(mut self, effort: impl Into<String>) -> Self {
        self.reasoning_effort = effort.into();
        self
    }

    /// Set the iteration budget.
    #[must_use]
    pub fn max_iterations(mut self, n: i32) -> Self {
        self.max_iterations = n;
        self
    }

    /// Whether the iteration budget allows at least one cycle.
    #[must_use]
    pub fn has_budget(&self) -> bool {
        self.max_iterations >= 1
    }
}
