//! Completion calls: plain, streaming, and the simple-chat shortcut.

use std::pin::Pin;

use futures_util::{Stream, StreamExt, TryStreamExt};
use tracing::{debug, error};

use crate::provider::check_status;
use crate::streaming::response_events;
use crate::{AiError, ChatMessage};

use super::client::{parse_chunk, parse_response, CompletionClient, COMPLETIONS_PATH};
use super::options::CompletionOptions;

/// Lazy, one-pass sequence of text fragments from a streaming completion.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, AiError>> + Send>>;

/// Result of [`CompletionClient::chat_completion`].
pub enum Completion {
    /// Full text of the first choice (`stream = false`).
    Text(String),
    /// Incremental fragments (`stream = true`).
    Stream(FragmentStream),
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Completion::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Completion::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl CompletionClient {
    /// Issue one completion request.
    ///
    /// Returns the first choice's text, or a fragment stream when
    /// `options.stream` is set. Provider failures are returned unchanged.
    pub async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<Completion, AiError> {
        if messages.is_empty() {
            return Err(AiError::InvalidRequest("messages must not be empty".into()));
        }

        let body = self.build_request_body(messages, options);
        debug!(
            model = %self.resolve_model(options),
            stream = options.stream,
            temperature = options.temperature,
            "chat completion request"
        );

        let result = self.send(&body).await;
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "chat completion request failed");
                return Err(e);
            }
        };

        if options.stream {
            let fragments = response_events(response)
                .try_filter_map(|event| async move { parse_chunk(&event.data) });
            return Ok(Completion::Stream(Box::pin(fragments)));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AiError::upstream(format!("invalid completion response: {e}")))?;
        let text = parse_response(&json)?;
        debug!("chat completion request successful");
        Ok(Completion::Text(text))
    }

    /// Stream a completion and concatenate every non-empty fragment.
    ///
    /// Any error aborts the accumulation; no partial text is returned.
    pub async fn stream_chat_completion(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> Result<String, AiError> {
        debug!("starting streaming chat completion");
        let options = options.clone().with_stream(true);

        let result = match self.chat_completion(messages, &options).await? {
            Completion::Stream(stream) => collect_fragments(stream).await,
            Completion::Text(text) => Ok(text),
        };

        match result {
            Ok(text) => {
                debug!(chars = text.len(), "streaming chat completion finished");
                Ok(text)
            }
            Err(e) => {
                error!(error = %e, "streaming chat completion failed");
                Err(e)
            }
        }
    }

    /// Ask a single question, optionally preceded by a system prompt,
    /// using the client's default options.
    pub async fn simple_chat(
        &self,
        message: &str,
        system_prompt: Option<&str>,
    ) -> Result<String, AiError> {
        debug!(system_prompt = system_prompt.is_some(), "simple chat");
        let messages = prompt_messages(message, system_prompt);

        match self
            .chat_completion(&messages, &self.default_options)
            .await?
        {
            Completion::Text(text) => Ok(text),
            Completion::Stream(stream) => collect_fragments(stream).await,
        }
    }

    async fn send(&self, body: &serde_json::Value) -> Result<reqwest::Response, AiError> {
        let url = self.settings.endpoint(&COMPLETIONS_PATH)?;
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.settings.api_key)
            .json(body)
            .send()
            .await?;
        check_status(response).await
    }
}

/// `[system?, user]`: the message list for a one-question exchange.
/// An empty system prompt is left out.
pub fn prompt_messages(message: &str, system_prompt: Option<&str>) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = system_prompt.filter(|s| !s.is_empty()) {
        messages.push(ChatMessage::system(system));
    }
    messages.push(ChatMessage::user(message));
    messages
}

/// Drive a fragment stream to completion, joining non-empty fragments in
/// arrival order.
pub async fn collect_fragments<S>(stream: S) -> Result<String, AiError>
where
    S: Stream<Item = Result<String, AiError>>,
{
    futures_util::pin_mut!(stream);
    let mut full_response = String::new();
    while let Some(fragment) = stream.next().await {
        let fragment = fragment?;
        if !fragment.is_empty() {
            full_response.push_str(&fragment);
        }
    }
    Ok(full_response)
}
