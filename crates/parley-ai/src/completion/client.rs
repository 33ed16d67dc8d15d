//! Completion client struct, request building, and response parsing.

use crate::provider::ProviderSettings;
use crate::{AiError, ChatMessage};

use super::options::CompletionOptions;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub(crate) const COMPLETIONS_PATH: [&str; 2] = ["chat", "completions"];

/// Completion API client.
///
/// Holds no conversation state; every call is independent.
pub struct CompletionClient {
    pub(crate) settings: ProviderSettings,
    pub(crate) default_model: String,
    /// Options used by [`CompletionClient::simple_chat`].
    pub(crate) default_options: CompletionOptions,
    pub(crate) http: reqwest::Client,
}

impl std::fmt::Debug for CompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionClient")
            .field("settings", &self.settings)
            .field("default_model", &self.default_model)
            .field("default_options", &self.default_options)
            .finish()
    }
}

impl CompletionClient {
    /// Create a client. Fails with `MissingCredential` if the key is blank.
    pub fn new(settings: ProviderSettings) -> Result<Self, AiError> {
        settings.ensure_credential()?;
        let http = settings.build_http_client()?;
        tracing::info!(model = DEFAULT_MODEL, "initializing completion client");
        Ok(Self {
            settings,
            default_model: DEFAULT_MODEL.to_string(),
            default_options: CompletionOptions::default(),
            http,
        })
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Sampling options for calls that take none (`simple_chat`).
    pub fn with_default_options(mut self, options: CompletionOptions) -> Self {
        self.default_options = options;
        self
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub fn default_options(&self) -> &CompletionOptions {
        &self.default_options
    }

    pub(crate) fn resolve_model<'a>(&'a self, options: &'a CompletionOptions) -> &'a str {
        options.model.as_deref().unwrap_or(&self.default_model)
    }

    /// Build the JSON request body for the completions endpoint.
    pub(crate) fn build_request_body(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.resolve_model(options),
            "messages": messages,
            "temperature": options.temperature,
            "top_p": options.top_p,
            "stream": options.stream,
            "store": false,
        });

        if let Some(max_tokens) = options.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }
        if let Some(ref functions) = options.functions {
            body["functions"] = serde_json::json!(functions);
        }
        if let Some(ref function_call) = options.function_call {
            body["function_call"] = function_call.clone();
        }

        body
    }
}

/// Extract the first choice's text from a non-streaming response.
///
/// A choice without text content (e.g. a function call) yields `""`.
pub(crate) fn parse_response(json: &serde_json::Value) -> Result<String, AiError> {
    let first = json["choices"]
        .as_array()
        .and_then(|choices| choices.first())
        .ok_or_else(|| AiError::upstream("completion response has no choices"))?;

    match first["message"]["content"].as_str() {
        Some(text) => Ok(text.to_string()),
        None => {
            tracing::debug!("first choice carries no text content");
            Ok(String::new())
        }
    }
}

/// Extract the text fragment from one streamed chunk.
///
/// Returns `None` for the `[DONE]` sentinel and for chunks whose delta
/// carries no `content` field (role announcements, finish markers).
pub(crate) fn parse_chunk(data: &str) -> Result<Option<String>, AiError> {
    if data.trim() == "[DONE]" {
        return Ok(None);
    }
    let chunk: serde_json::Value = serde_json::from_str(data)
        .map_err(|e| AiError::upstream(format!("malformed stream chunk: {e}")))?;

    if let Some(message) = chunk["error"]["message"].as_str() {
        return Err(AiError::upstream(message.to_string()));
    }

    Ok(chunk["choices"][0]["delta"]["content"]
        .as_str()
        .map(String::from))
}
