//! Full configuration validation.
//!
//! Checks numeric ranges and required strings, collecting every problem
//! into a single `ConfigError`.

mod helpers;


use crate::schema::ParleyConfig;
use parley_common::ConfigError;

use helpers::{validate_non_empty, validate_range_f64, validate_range_u64};

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &ParleyConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_provider(&mut errors, config);
    validate_completion(&mut errors, config);
    validate_assistant(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_provider(errors: &mut Vec<String>, config: &ParleyConfig) {
    let p = &config.provider;
    validate_non_empty(errors, "provider.base_url", &p.base_url);
    validate_non_empty(errors, "provider.api_key_env", &p.api_key_env);
    validate_range_u64(errors, "provider.connect_timeout_secs", p.connect_timeout_secs, 1, 300);
    validate_range_u64(errors, "provider.request_timeout_secs", p.request_timeout_secs, 1, 3600);
}

fn validate_completion(errors: &mut Vec<String>, config: &ParleyConfig) {
    let c = &config.completion;
    validate_non_empty(errors, "completion.model", &c.model);
    validate_range_f64(errors, "completion.temperature", c.temperature, 0.0, 2.0);
    validate_range_f64(errors, "completion.top_p", c.top_p, 0.0, 1.0);
    if c.max_tokens == Some(0) {
        errors.push("completion.max_tokens must be greater than 0".to_string());
    }
}

fn validate_assistant(errors: &mut Vec<String>, config: &ParleyConfig) {
    let a = &config.assistant;
    if let Some(ref id) = a.assistant_id {
        validate_non_empty(errors, "assistant.assistant_id", id);
    }
    validate_range_u64(errors, "assistant.poll_interval_ms", a.poll_interval_ms, 10, 60_000);
}
