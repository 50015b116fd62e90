//! Supported Qwen models and credential format checks.

/// Qwen Turbo: balanced performance and cost.
pub const QWEN_TURBO: &str = "qwen-turbo";
/// Qwen Plus: enhanced understanding.
pub const QWEN_PLUS: &str = "qwen-plus";
/// Qwen Max: highest capability.
pub const QWEN_MAX: &str = "qwen-max";
/// Qwen Long: long-context text.
pub const QWEN_LONG: &str = "qwen-long";
/// Qwen VL: vision-language.
pub const QWEN_VL: &str = "qwen-vl-plus";
/// Qwen Audio: audio understanding.
pub const QWEN_AUDIO: &str = "qwen-audio-turbo";

/// Every model id the provider accepts.
pub const SUPPORTED_MODELS: &[&str] = &[
    QWEN_TURBO, QWEN_PLUS, QWEN_MAX, QWEN_LONG, QWEN_VL, QWEN_AUDIO,
];

const MIN_API_KEY_LEN: usize = 20;

/// Check whether `model` is a supported model id. Matching is exact.
#[must_use]
pub fn is_valid_model(model: &str) -> bool {
    SUPPORTED_MODELS.contains(&model)
}

/// Basic format check for a DashScope API key.
#[must_use]
pub fn is_valid_api_key(key: &str) -> bool {
    !key.is_empty() && key.len() >= MIN_API_KEY_LEN
}
