//! Session manager struct, thread lookups and the cached default thread.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::OnceCell;
use tracing::{debug, error, info};

use crate::AiError;

use super::backend::AssistantBackend;
use super::response::ResponseOptions;
use super::types::{AssistantInfo, HistoryEntry, ListOrder, Thread, ThreadMessage};

/// Default page size for message listings.
pub const DEFAULT_HISTORY_LIMIT: u32 = 100;

/// Drives conversations with one provider-side assistant.
///
/// Holds a single "current thread" slot used when a call names no thread.
/// Concurrent sessions should each use their own manager; the backend can
/// be shared through the `Arc`.
pub struct SessionManager {
    pub(super) backend: Arc<dyn AssistantBackend>,
    pub(super) assistant_id: String,
    /// Lazily fetched assistant configuration, set at most once.
    assistant: OnceCell<AssistantInfo>,
    default_thread: Mutex<Option<String>>,
    pub(super) options: ResponseOptions,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("assistant_id", &self.assistant_id)
            .field("default_thread", &self.default_thread_id())
            .field("options", &self.options)
            .finish()
    }
}

impl SessionManager {
    pub fn new(backend: Arc<dyn AssistantBackend>, assistant_id: impl Into<String>) -> Self {
        let assistant_id = assistant_id.into();
        info!(assistant_id = %assistant_id, "initializing session manager");
        Self {
            backend,
            assistant_id,
            assistant: OnceCell::new(),
            default_thread: Mutex::new(None),
            options: ResponseOptions::default(),
        }
    }

    /// Options applied by [`SessionManager::get_response`].
    pub fn with_options(mut self, options: ResponseOptions) -> Self {
        self.options = options;
        self
    }

    pub fn assistant_id(&self) -> &str {
        &self.assistant_id
    }

    /// The cached current thread, if any.
    pub fn default_thread_id(&self) -> Option<String> {
        self.slot().clone()
    }

    fn slot(&self) -> MutexGuard<'_, Option<String>> {
        // The slot holds a plain Option; a poisoned lock still has a valid value.
        self.default_thread
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(super) fn store_default_thread(&self, thread_id: Option<String>) {
        *self.slot() = thread_id;
    }

    /// Fetch thread metadata. An unknown id is `ThreadNotFound`.
    pub async fn get_thread(&self, thread_id: &str) -> Result<Thread, AiError> {
        debug!(thread_id, "retrieving thread");
        self.backend
            .retrieve_thread(thread_id)
            .await
            .map_err(|e| {
                error!(thread_id, error = %e, "failed to retrieve thread");
                if e.is_missing_resource() {
                    AiError::ThreadNotFound {
                        thread_id: thread_id.to_string(),
                        source: Box::new(e),
                    }
                } else {
                    e
                }
            })
    }

    /// Set or clear the current thread.
    ///
    /// A new value is validated against the provider before it is stored;
    /// on failure the previous value is kept.
    pub async fn set_default_thread(&self, thread_id: Option<&str>) -> Result<(), AiError> {
        match thread_id {
            Some(id) => {
                info!(thread_id = id, "setting default thread");
                self.get_thread(id).await?;
                self.store_default_thread(Some(id.to_string()));
            }
            None => {
                info!("clearing default thread");
                self.store_default_thread(None);
            }
        }
        Ok(())
    }

    /// Explicit id if non-empty, else the current thread.
    pub(super) fn resolve_thread_id(&self, thread_id: Option<&str>) -> Result<String, AiError> {
        match thread_id.filter(|id| !id.is_empty()) {
            Some(id) => Ok(id.to_string()),
            None => self.default_thread_id().ok_or_else(|| {
                error!("no thread id provided or set as default thread");
                AiError::NoActiveThread
            }),
        }
    }

    /// List messages of a thread (explicit or current).
    pub async fn list_messages(
        &self,
        thread_id: Option<&str>,
        limit: u32,
        order: ListOrder,
    ) -> Result<Vec<ThreadMessage>, AiError> {
        let thread_id = self.resolve_thread_id(thread_id)?;
        debug!(thread_id = %thread_id, limit, order = order.as_str(), "listing messages");
        self.backend.list_messages(&thread_id, limit, order).await
    }

    /// Newest-first conversation history formatted for display.
    pub async fn get_thread_history(
        &self,
        thread_id: Option<&str>,
        limit: u32,
    ) -> Result<Vec<HistoryEntry>, AiError> {
        let messages = self
            .list_messages(thread_id, limit, ListOrder::Desc)
            .await?;
        Ok(messages.into_iter().map(HistoryEntry::from).collect())
    }

    /// The assistant configuration, fetched on first access and memoized.
    ///
    /// A failed fetch is not cached; the next call retries.
    pub async fn get_assistant_info(&self) -> Result<&AssistantInfo, AiError> {
        self.assistant
            .get_or_try_init(|| async {
                debug!(assistant_id = %self.assistant_id, "loading assistant details");
                self.backend
                    .retrieve_assistant(&self.assistant_id)
                    .await
                    .map_err(|e| {
                        error!(
                            assistant_id = %self.assistant_id,
                            error = %e,
                            "failed to retrieve assistant"
                        );
                        if e.is_missing_resource() {
                            AiError::AssistantNotFound {
                                assistant_id: self.assistant_id.clone(),
                                source: Box::new(e),
                            }
                        } else {
                            e
                        }
                    })
            })
            .await
    }
}
