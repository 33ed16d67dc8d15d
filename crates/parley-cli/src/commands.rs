//! Subcommand handlers: wire configuration into the conversation engine.

use std::sync::Arc;
use std::time::Duration;

use parley_ai::{
    prompt_messages, AiError, CompletionClient, CompletionOptions, HttpAssistantBackend,
    ProviderSettings, ResponseOptions, SessionManager,
};
use parley_common::ParleyError;
use parley_config::{config_to_json, AssistantConfig, CompletionConfig, ParleyConfig, ProviderConfig};
use tokio_util::sync::CancellationToken;

use crate::cli::Command;

pub async fn run(command: Command, config: &ParleyConfig) -> Result<(), ParleyError> {
    match command {
        Command::Ask { question, thread } => {
            let manager = session_manager(config)?;
            let options = response_options(&config.assistant).with_cancellation(ctrl_c_token());
            let reply = manager
                .get_response_with(&question, thread.as_deref(), &options)
                .await
                .map_err(ai_error)?;
            eprintln!("thread: {}", reply.thread_id);
            println!("{}", reply.message());
        }
        Command::History { thread, limit } => {
            let manager = session_manager(config)?;
            let history = manager
                .get_thread_history(Some(&thread), limit)
                .await
                .map_err(ai_error)?;
            for entry in history {
                println!(
                    "[{}] {} ({}): {}",
                    entry.created_at,
                    entry.role,
                    entry.id,
                    entry.content.as_deref().unwrap_or("")
                );
            }
        }
        Command::Chat {
            message,
            system,
            stream,
        } => {
            let client = CompletionClient::new(provider_settings(&config.provider)?)
                .map_err(ai_error)?
                .with_default_model(&config.completion.model)
                .with_default_options(completion_options(&config.completion));
            chat(&client, &message, system.as_deref(), stream).await?;
        }
        Command::Assistant => {
            let manager = session_manager(config)?;
            let info = manager.get_assistant_info().await.map_err(ai_error)?;
            let json = serde_json::to_string_pretty(info)
                .map_err(|e| ParleyError::Other(format!("failed to render assistant: {e}")))?;
            println!("{json}");
        }
        Command::Config => println!("{}", config_to_json(config)),
    }
    Ok(())
}

async fn chat(
    client: &CompletionClient,
    message: &str,
    system: Option<&str>,
    stream: bool,
) -> Result<(), ParleyError> {
    let result = if stream {
        let messages = prompt_messages(message, system);
        client
            .stream_chat_completion(&messages, client.default_options())
            .await
    } else {
        client.simple_chat(message, system).await
    };
    println!("{}", result.map_err(ai_error)?);
    Ok(())
}

/// Sampling options from `[completion]`; the model is set on the client.
fn completion_options(config: &CompletionConfig) -> CompletionOptions {
    let options = CompletionOptions::default()
        .with_temperature(config.temperature)
        .with_top_p(config.top_p);
    match config.max_tokens {
        Some(max_tokens) => options.with_max_tokens(max_tokens),
        None => options,
    }
}

fn provider_settings(config: &ProviderConfig) -> Result<ProviderSettings, ParleyError> {
    let settings = ProviderSettings::from_env(&config.api_key_env).map_err(ai_error)?;
    Ok(settings.with_base_url(&config.base_url).with_timeouts(
        Duration::from_secs(config.connect_timeout_secs),
        Duration::from_secs(config.request_timeout_secs),
    ))
}

fn session_manager(config: &ParleyConfig) -> Result<SessionManager, ParleyError> {
    let assistant_id = config.assistant.assistant_id.clone().ok_or_else(|| {
        ParleyError::Other(format!(
            "no assistant configured: set [assistant].assistant_id or {}",
            parley_config::ASSISTANT_ID_ENV
        ))
    })?;
    let backend = HttpAssistantBackend::new(provider_settings(&config.provider)?).map_err(ai_error)?;
    Ok(SessionManager::new(Arc::new(backend), assistant_id)
        .with_options(response_options(&config.assistant)))
}

/// `max_wait_secs = 0` waits without a deadline.
fn response_options(config: &AssistantConfig) -> ResponseOptions {
    let max_wait = (config.max_wait_secs > 0).then(|| Duration::from_secs(config.max_wait_secs));
    ResponseOptions::default()
        .with_poll_interval(Duration::from_millis(config.poll_interval_ms))
        .with_max_wait(max_wait)
}

/// Cancelled on Ctrl-C; the remote run is left to finish on its own.
fn ctrl_c_token() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, no longer waiting for the assistant");
            trigger.cancel();
        }
    });
    token
}

fn ai_error(e: AiError) -> ParleyError {
    if e.is_not_found() {
        ParleyError::NotFound(e.to_string())
    } else {
        ParleyError::Ai(e.to_string())
    }
}
