//! Tests for TOML config loading, creation, and path resolution.

use super::*;
use crate::schema::LogLevel;
use std::path::Path;

#[test]
fn load_from_nonexistent_returns_parse_error() {
    let result = load_from_path(Path::new("/tmp/nonexistent_parley_config.toml"));
    let err = result.unwrap_err();
    assert!(matches!(err, parley_common::ConfigError::ParseError(_)));
}

#[test]
fn load_valid_partial_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[completion]
model = "gpt-4o"
temperature = 0.2

[assistant]
assistant_id = "asst_abc"

[logging]
level = "debug"
"#,
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.completion.model, "gpt-4o");
    assert_eq!(config.completion.temperature, 0.2);
    assert_eq!(config.assistant.assistant_id.as_deref(), Some("asst_abc"));
    assert_eq!(config.logging.level, LogLevel::Debug);
    // Defaults preserved
    assert_eq!(config.completion.top_p, 0.7);
    assert_eq!(config.assistant.poll_interval_ms, 1000);
    assert_eq!(config.provider.api_key_env, "OPENAI_API_KEY");
}

#[test]
fn load_invalid_toml_returns_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "this is not valid toml {{{").unwrap();

    let err = load_from_path(&path).unwrap_err();
    assert!(matches!(err, parley_common::ConfigError::ParseError(_)));
}

#[test]
fn create_and_load_default_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("parley").join("config.toml");

    create_default_config(&path).unwrap();
    assert!(path.exists());

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.completion.model, "gpt-4o-mini");
    assert_eq!(config.assistant.assistant_id, None);
    assert_eq!(config.assistant.max_wait_secs, 300);
    assert!(crate::validation::validate(&config).is_ok());
}

#[test]
fn default_config_path_ends_with_parley() {
    if let Ok(path) = default_config_path() {
        assert!(path.ends_with("parley/config.toml"));
    }
}
