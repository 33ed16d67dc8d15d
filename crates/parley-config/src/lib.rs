//! Parley configuration system.
//!
//! TOML-based configuration for the provider connection, completion
//! defaults, the assistant session and logging. Every section uses serde
//! defaults so partial configs work out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use parley_config::{load_config, config_to_json};
//!
//! let config = load_config(None).expect("failed to load config");
//! let json = config_to_json(&config);
//! println!("{json}");
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{
    AssistantConfig, CompletionConfig, LogLevel, LoggingConfig, ParleyConfig, ProviderConfig,
    CONFIG_SCHEMA_VERSION,
};

use std::path::Path;

use parley_common::ConfigError;

/// Environment variable that overrides `[assistant].assistant_id`.
pub const ASSISTANT_ID_ENV: &str = "DEFAULT_ASSISTANT_ID";
/// Environment variable that overrides `[completion].model`.
pub const MODEL_ENV: &str = "DEFAULT_OPENAI_MODEL";

/// Load config from `path`, or from the platform default path when `None`.
///
/// The default path is created with a commented template if it does not
/// exist. Environment overrides are applied and the result is validated.
pub fn load_config(path: Option<&Path>) -> Result<ParleyConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::FileNotFound(path.to_path_buf()));
            }
            toml_loader::load_from_path(path)?
        }
        None => toml_loader::load_default()?,
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validation::validate(&config)?;
    Ok(config)
}

/// Apply environment overrides using `lookup` to read variables.
pub fn apply_env_overrides(config: &mut ParleyConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(id) = lookup(ASSISTANT_ID_ENV).filter(|v| !v.trim().is_empty()) {
        tracing::debug!("assistant id taken from {ASSISTANT_ID_ENV}");
        config.assistant.assistant_id = Some(id.trim().to_string());
    }
    if let Some(model) = lookup(MODEL_ENV).filter(|v| !v.trim().is_empty()) {
        tracing::debug!("completion model taken from {MODEL_ENV}");
        config.completion.model = model.trim().to_string();
    }
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &ParleyConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
