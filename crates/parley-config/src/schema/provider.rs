//! Provider connection and completion defaults.

use serde::{Deserialize, Serialize};

/// Connection settings for the remote model provider.
///
/// The credential itself never lives in the config file; `api_key_env`
/// names the environment variable it is read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key_env: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 120,
        }
    }
}

/// Defaults applied to single-shot completion requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub model: String,
    /// Sampling temperature (valid range: 0.0-2.0).
    pub temperature: f64,
    /// Nucleus sampling mass (valid range: 0.0-1.0).
    pub top_p: f64,
    pub max_tokens: Option<u32>,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.6,
            top_p: 0.7,
            max_tokens: None,
        }
    }
}
