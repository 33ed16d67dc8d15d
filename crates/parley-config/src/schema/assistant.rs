use serde::{Deserialize, Serialize};

/// Assistant session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub assistant_id: Option<String>,
    /// Delay between run status checks (valid range: 10-60000).
    pub poll_interval_ms: u64,
    /// Longest time to wait for a run locally; 0 disables the limit.
    pub max_wait_secs: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            assistant_id: None,
            poll_interval_ms: 1000,
            max_wait_secs: 300,
        }
    }
}
