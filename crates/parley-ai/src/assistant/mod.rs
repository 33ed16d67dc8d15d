//! Assistant sessions: threads, runs and the polling protocol.
//!
//! `SessionManager` is the stateful part (lazy assistant info, current
//! thread). It talks to the provider through [`AssistantBackend`], with
//! [`HttpAssistantBackend`] as the production implementation.

mod backend;
mod http;
mod manager;
mod response;
mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::AssistantBackend;
pub use http::HttpAssistantBackend;
pub use manager::{SessionManager, DEFAULT_HISTORY_LIMIT};
pub use response::{PollPolicy, Reply, ResponseOptions, RunOutcome};
pub use types::{
    AssistantInfo, HistoryEntry, ListOrder, Run, RunError, RunStatus, Thread, ThreadMessage,
};
