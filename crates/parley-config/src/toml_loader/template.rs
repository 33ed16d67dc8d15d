//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> &'static str {
    r##"# Parley Configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[provider]
# base_url = "https://api.openai.com/v1"
# api_key_env = "OPENAI_API_KEY"   # variable holding the bearer credential
# connect_timeout_secs = 10        # 1-300
# request_timeout_secs = 120       # 1-3600

[completion]
# model = "gpt-4o-mini"
# temperature = 0.6                # 0.0-2.0
# top_p = 0.7                      # 0.0-1.0
# max_tokens = 1024

[assistant]
# assistant_id = "asst_..."        # DEFAULT_ASSISTANT_ID overrides this
# poll_interval_ms = 1000          # 10-60000
# max_wait_secs = 300              # 0 = wait indefinitely

[logging]
# level = "info"                   # trace, debug, info, warn, error
"##
}
