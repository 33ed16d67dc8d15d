//! The ask protocol: resolve thread, append message, run, poll, fetch reply.

use std::fmt;
use std::time::Duration;

use parley_common::CorrelationId;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn, Instrument};

use crate::{AiError, Role};

use super::manager::SessionManager;
use super::types::{ListOrder, Run, RunStatus};

/// How often to check a run, and how long to wait for it at most.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// `None` waits until the run ends or the caller cancels.
    pub max_wait: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_wait: Some(Duration::from_secs(300)),
        }
    }
}

/// Per-call options for [`SessionManager::get_response_with`].
#[derive(Debug, Clone, Default)]
pub struct ResponseOptions {
    pub poll: PollPolicy,
    /// Stops the local wait; the remote run keeps going.
    pub cancel: Option<CancellationToken>,
}

impl ResponseOptions {
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll.interval = interval;
        self
    }

    pub fn with_max_wait(mut self, max_wait: Option<Duration>) -> Self {
        self.poll.max_wait = max_wait;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// How a completed `get_response` call ended.
///
/// A failed or expired run is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Text of the newest assistant message.
    Answered(String),
    /// The run ended in `failed` or `expired`.
    RunFailed(RunStatus),
    /// The run completed but the newest message is not from the assistant.
    NoAssistantMessage,
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Answered(text) => f.write_str(text),
            RunOutcome::RunFailed(status) => write!(f, "Error: Assistant run {status}"),
            RunOutcome::NoAssistantMessage => f.write_str("No response received from assistant"),
        }
    }
}

/// Result of one question: the outcome and the thread actually used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub thread_id: String,
    pub outcome: RunOutcome,
}

impl Reply {
    /// The reply text; failure outcomes render as descriptive sentences.
    pub fn message(&self) -> String {
        self.outcome.to_string()
    }

    pub fn is_answered(&self) -> bool {
        matches!(self.outcome, RunOutcome::Answered(_))
    }
}

impl SessionManager {
    /// Ask `question` using the manager's configured options.
    pub async fn get_response(
        &self,
        question: &str,
        thread_id: Option<&str>,
    ) -> Result<Reply, AiError> {
        let options = self.options.clone();
        self.get_response_with(question, thread_id, &options).await
    }

    /// Ask `question` on the explicit thread, the current thread, or a new
    /// thread (which becomes current), then wait for the assistant's reply.
    pub async fn get_response_with(
        &self,
        question: &str,
        thread_id: Option<&str>,
        options: &ResponseOptions,
    ) -> Result<Reply, AiError> {
        let cid = CorrelationId::new();
        let span = tracing::info_span!("get_response", cid = %cid);
        async move {
            let result = self.ask(question, thread_id, options).await;
            if let Err(ref e) = result {
                error!(error = %e, "error getting assistant response");
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn ask(
        &self,
        question: &str,
        thread_id: Option<&str>,
        options: &ResponseOptions,
    ) -> Result<Reply, AiError> {
        let thread_id = self.resolve_or_create_thread(thread_id).await?;

        debug!(thread_id = %thread_id, "adding user message to thread");
        self.backend
            .create_message(&thread_id, Role::User, question)
            .await?;

        debug!(thread_id = %thread_id, "starting assistant run");
        let run = self
            .backend
            .create_run(&thread_id, &self.assistant_id)
            .await?;
        let run = self.wait_for_run(&thread_id, run, options).await?;

        let outcome = match run.status {
            RunStatus::Completed => self.latest_reply(&thread_id).await?,
            status => {
                match &run.last_error {
                    Some(cause) => error!(
                        run_id = %run.id,
                        status = %status,
                        code = %cause.code,
                        reason = %cause.message,
                        "assistant run did not complete"
                    ),
                    None => error!(run_id = %run.id, status = %status, "assistant run did not complete"),
                }
                RunOutcome::RunFailed(status)
            }
        };

        Ok(Reply { thread_id, outcome })
    }

    /// Pick the thread for a question and make it current.
    async fn resolve_or_create_thread(&self, thread_id: Option<&str>) -> Result<String, AiError> {
        if let Some(id) = thread_id.filter(|id| !id.is_empty()) {
            debug!(thread_id = id, "using explicit thread");
            self.set_default_thread(Some(id)).await?;
            return Ok(id.to_string());
        }

        if let Some(id) = self.default_thread_id() {
            debug!(thread_id = %id, "using default thread");
            let thread = self.get_thread(&id).await?;
            return Ok(thread.id);
        }

        debug!("creating new thread");
        let thread = self.backend.create_thread().await?;
        info!(thread_id = %thread.id, "created thread");
        self.store_default_thread(Some(thread.id.clone()));
        Ok(thread.id)
    }

    /// Poll until the run reaches a terminal status.
    ///
    /// The run is always checked once more after the last sleep, so a run
    /// that finished just before the deadline is still reported.
    async fn wait_for_run(
        &self,
        thread_id: &str,
        mut run: Run,
        options: &ResponseOptions,
    ) -> Result<Run, AiError> {
        let started = Instant::now();
        let deadline = options.poll.max_wait.map(|max| started + max);

        while !run.status.is_terminal() {
            let pause = tokio::time::sleep(options.poll.interval);
            match &options.cancel {
                Some(token) => {
                    tokio::select! {
                        _ = token.cancelled() => {
                            warn!(run_id = %run.id, "stopped waiting for run: cancelled");
                            return Err(AiError::Cancelled { run_id: run.id });
                        }
                        _ = pause => {}
                    }
                }
                None => pause.await,
            }

            run = self.backend.retrieve_run(thread_id, &run.id).await?;
            debug!(run_id = %run.id, status = %run.status, "run status");

            if run.status.is_terminal() {
                break;
            }
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                let waited = started.elapsed();
                warn!(run_id = %run.id, ?waited, "stopped waiting for run: deadline reached");
                return Err(AiError::PollTimeout {
                    run_id: run.id,
                    waited,
                });
            }
        }

        Ok(run)
    }

    /// Newest message of the thread, if it was written by the assistant.
    async fn latest_reply(&self, thread_id: &str) -> Result<RunOutcome, AiError> {
        debug!(thread_id, "getting assistant response");
        let latest = self
            .backend
            .list_messages(thread_id, 1, ListOrder::Desc)
            .await?;

        match latest.into_iter().find(|msg| msg.role == Role::Assistant) {
            Some(msg) => Ok(RunOutcome::Answered(msg.content.unwrap_or_default())),
            None => {
                warn!(thread_id, "no assistant response received");
                Ok(RunOutcome::NoAssistantMessage)
            }
        }
    }
}
