//! Transport seam for the provider's assistant endpoints.

use async_trait::async_trait;

use crate::{AiError, Role};

use super::types::{AssistantInfo, ListOrder, Run, Thread, ThreadMessage};

/// The four remote sub-resources the session manager talks to:
/// threads, messages, runs and assistants.
///
/// A lookup of an unknown id must fail with an `AiError::Upstream` whose
/// status is 404 so the manager can report it as not found.
#[async_trait]
pub trait AssistantBackend: Send + Sync {
    async fn create_thread(&self) -> Result<Thread, AiError>;

    async fn retrieve_thread(&self, thread_id: &str) -> Result<Thread, AiError>;

    async fn create_message(
        &self,
        thread_id: &str,
        role: Role,
        content: &str,
    ) -> Result<ThreadMessage, AiError>;

    async fn list_messages(
        &self,
        thread_id: &str,
        limit: u32,
        order: ListOrder,
    ) -> Result<Vec<ThreadMessage>, AiError>;

    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run, AiError>;

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run, AiError>;

    async fn retrieve_assistant(&self, assistant_id: &str) -> Result<AssistantInfo, AiError>;
}
