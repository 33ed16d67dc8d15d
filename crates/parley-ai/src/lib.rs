//! Conversation engine for Parley.
//!
//! Provides:
//! - A completion client for single-shot chat requests, with SSE streaming
//! - A session manager that drives assistant threads: message submission,
//!   asynchronous runs, status polling and reply extraction
//! - `ChatService`, the send/history contract offered to outer layers

pub mod assistant;
pub mod completion;
pub mod provider;
pub mod service;
pub mod streaming;

#[cfg(test)]
mod mock_server;

use std::fmt;
use std::time::Duration;

pub use assistant::{
    AssistantBackend, AssistantInfo, HistoryEntry, HttpAssistantBackend, ListOrder, PollPolicy,
    Reply, ResponseOptions, Run, RunOutcome, RunStatus, SessionManager, Thread, ThreadMessage,
};
pub use completion::{
    prompt_messages, Completion, CompletionClient, CompletionOptions, FragmentStream,
};
pub use provider::ProviderSettings;
pub use service::{ChatService, InMemoryThreadRegistry, SendResult, ThreadRecord, ThreadRegistry};

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `{role, content}` turn sent to the completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("missing credential: {0}")]
    MissingCredential(String),

    /// Transport, authentication, rate-limit or decode failure of a single
    /// remote call. `status` is the HTTP status when one was received.
    #[error("upstream request failed: {message}")]
    Upstream {
        status: Option<u16>,
        message: String,
    },

    #[error("thread '{thread_id}' does not exist")]
    ThreadNotFound {
        thread_id: String,
        #[source]
        source: Box<AiError>,
    },

    #[error("assistant '{assistant_id}' does not exist")]
    AssistantNotFound {
        assistant_id: String,
        #[source]
        source: Box<AiError>,
    },

    #[error("no thread id provided and no default thread set")]
    NoActiveThread,

    #[error("thread '{0}' is not a known thread")]
    UntrackedThread(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("stopped waiting for run {run_id}: cancelled")]
    Cancelled { run_id: String },

    #[error("run {run_id} still unfinished after {waited:?}")]
    PollTimeout { run_id: String, waited: Duration },
}

impl AiError {
    pub fn upstream(message: impl Into<String>) -> Self {
        AiError::Upstream {
            status: None,
            message: message.into(),
        }
    }

    /// Build an error for a non-success HTTP response.
    ///
    /// A provider error body (`{"error": {"message", "type", "code"}}`) is
    /// kept whole; any other body is cut to 200 characters.
    pub fn http(status: reqwest::StatusCode, body: &str) -> Self {
        let detail = match provider_error_detail(body) {
            Some(detail) => detail,
            None => body.chars().take(200).collect(),
        };
        AiError::Upstream {
            status: Some(status.as_u16()),
            message: format!("HTTP {status}: {detail}"),
        }
    }

    /// The upstream answered 404 for the requested resource.
    pub fn is_missing_resource(&self) -> bool {
        matches!(self, AiError::Upstream { status: Some(404), .. })
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, AiError::Upstream { status: Some(429), .. })
    }

    /// Any "does not exist" outcome a caller may present as not found.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AiError::ThreadNotFound { .. }
                | AiError::AssistantNotFound { .. }
                | AiError::UntrackedThread(_)
        )
    }
}

/// `message (type: ..., code: ...)` from a provider error body.
fn provider_error_detail(body: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    let error = json.get("error")?;
    let mut detail = error["message"].as_str()?.to_string();

    let extras: Vec<String> = ["type", "code"]
        .into_iter()
        .filter_map(|key| match &error[key] {
            serde_json::Value::String(value) => Some(format!("{key}: {value}")),
            serde_json::Value::Number(value) => Some(format!("{key}: {value}")),
            _ => None,
        })
        .collect();
    if !extras.is_empty() {
        detail.push_str(&format!(" ({})", extras.join(", ")));
    }
    Some(detail)
}

impl From<reqwest::Error> for AiError {
    fn from(err: reqwest::Error) -> Self {
        AiError::Upstream {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}
