//! Provider configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tongyi_models::{ChatProvider, HttpChatClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use tongyi_streaming::DEFAULT_PIPE_CAPACITY;
use tracing::{debug, warn};
use url::Url;

/// Primary environment variable for the API key.
pub const API_KEY_ENV: &str = "DASHSCOPE_API_KEY";
/// Fallback environment variable for the API key.
pub const FALLBACK_API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Environment variable overriding the base URL.
pub const BASE_URL_ENV: &str = "DASHSCOPE_BASE_URL";

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_pipe_capacity() -> usize {
    DEFAULT_PIPE_CAPACITY
}

/// Configuration for a [`ChatProvider`] over HTTP.
///
/// Building a provider never fails: a missing or malformed key is reported
/// by the first call that needs the network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key for authentication.
    #[serde(default, skip_serializing)]
    pub api_key: String,
    /// Base URL for the API. `None` means the DashScope compatible-mode URL.
    #[serde(default)]
    pub base_url: Option<Url>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Capacity of the streaming pipe.
    #[serde(default = "default_pipe_capacity")]
    pub pipe_capacity: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            pipe_capacity: DEFAULT_PIPE_CAPACITY,
        }
    }
}

impl ProviderConfig {
    /// Create a config with defaults and no key.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from the process environment.
    ///
    /// The key comes from `DASHSCOPE_API_KEY`, falling back to
    /// `OPENAI_API_KEY`. Empty values are ignored. `DASHSCOPE_BASE_URL`
    /// overrides the endpoint when it parses as a URL.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = non_empty(API_KEY_ENV)
            .or_else(|| non_empty(FALLBACK_API_KEY_ENV))
            .unwrap_or_default();
        if api_key.is_empty() {
            debug!("No API key found in environment");
        }

        let base_url = non_empty(BASE_URL_ENV).and_then(|raw| match Url::parse(&raw) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(value = %raw, error = %e, "Ignoring invalid {}", BASE_URL_ENV);
                None
            }
        });

        Self {
            api_key,
            base_url,
            ..Self::default()
        }
    }

    /// Set the API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    /// Set the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Set the request timeout in seconds.
    #[must_use]
    pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Set the streaming pipe capacity.
    #[must_use]
    pub fn with_pipe_capacity(mut self, capacity: usize) -> Self {
        self.pipe_capacity = capacity;
        self
    }

    /// The effective base URL.
    pub fn endpoint(&self) -> &str {
        self.base_url.as_ref().map_or(DEFAULT_BASE_URL, Url::as_str)
    }

    /// Build the HTTP client.
    pub fn build_client(&self) -> HttpChatClient {
        HttpChatClient::new(self.api_key.clone())
            .with_base_url(self.endpoint())
            .with_timeout(Duration::from_secs(self.timeout_seconds))
    }

    /// Build a provider.
    pub fn build(&self) -> ChatProvider<HttpChatClient> {
        ChatProvider::new(self.build_client()).with_pipe_capacity(self.pipe_capacity)
    }
}
