//! `send` / `history`: the two operations offered to outer layers.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::assistant::{
    AssistantBackend, HistoryEntry, ResponseOptions, SessionManager, DEFAULT_HISTORY_LIMIT,
};
use crate::AiError;

/// A thread this process has used, kept so callers can list known threads.
///
/// Not the source of truth for thread content; that lives upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadRecord {
    pub thread_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Local record of known threads.
#[async_trait]
pub trait ThreadRegistry: Send + Sync {
    /// Insert the thread, or bump `updated_at` if it is already known.
    async fn record(&self, thread_id: &str) -> ThreadRecord;

    async fn contains(&self, thread_id: &str) -> bool;

    /// All known threads, newest first by `created_at`.
    async fn list(&self) -> Vec<ThreadRecord>;
}

/// Process-local registry.
#[derive(Clone, Default)]
pub struct InMemoryThreadRegistry {
    threads: Arc<RwLock<HashMap<String, ThreadRecord>>>,
}

impl InMemoryThreadRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ThreadRegistry for InMemoryThreadRegistry {
    async fn record(&self, thread_id: &str) -> ThreadRecord {
        let now = Utc::now();
        let mut map = self.threads.write().await;
        let record = map
            .entry(thread_id.to_string())
            .and_modify(|r| r.updated_at = now)
            .or_insert_with(|| ThreadRecord {
                thread_id: thread_id.to_string(),
                created_at: now,
                updated_at: now,
            });
        record.clone()
    }

    async fn contains(&self, thread_id: &str) -> bool {
        self.threads.read().await.contains_key(thread_id)
    }

    async fn list(&self) -> Vec<ThreadRecord> {
        let mut records: Vec<_> = self.threads.read().await.values().cloned().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }
}

/// Answer to one `send`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResult {
    pub thread_id: String,
    pub message: String,
}

/// Entry point for outer layers (web handlers, the CLI).
///
/// Every `send` gets its own [`SessionManager`], so concurrent requests
/// never share a current-thread slot. The transport is shared.
#[derive(Clone)]
pub struct ChatService {
    backend: Arc<dyn AssistantBackend>,
    assistant_id: String,
    options: ResponseOptions,
    registry: Arc<dyn ThreadRegistry>,
}

impl std::fmt::Debug for ChatService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatService")
            .field("assistant_id", &self.assistant_id)
            .field("options", &self.options)
            .finish()
    }
}

impl ChatService {
    pub fn new(backend: Arc<dyn AssistantBackend>, assistant_id: impl Into<String>) -> Self {
        Self {
            backend,
            assistant_id: assistant_id.into(),
            options: ResponseOptions::default(),
            registry: Arc::new(InMemoryThreadRegistry::new()),
        }
    }

    pub fn with_options(mut self, options: ResponseOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_registry(mut self, registry: Arc<dyn ThreadRegistry>) -> Self {
        self.registry = registry;
        self
    }

    fn session(&self) -> SessionManager {
        SessionManager::new(self.backend.clone(), self.assistant_id.clone())
            .with_options(self.options.clone())
    }

    /// Ask a question on `thread_id`, or on a new thread when none is given.
    pub async fn send(&self, question: &str, thread_id: Option<&str>) -> Result<SendResult, AiError> {
        if question.trim().is_empty() {
            return Err(AiError::InvalidRequest("question must not be empty".into()));
        }

        let started = Instant::now();
        let reply = self.session().get_response(question, thread_id).await?;
        self.registry.record(&reply.thread_id).await;

        info!(
            thread_id = %reply.thread_id,
            answered = reply.is_answered(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "send finished"
        );
        Ok(SendResult {
            message: reply.message(),
            thread_id: reply.thread_id,
        })
    }

    /// Newest-first history of a thread previously seen by `send`.
    pub async fn history(&self, thread_id: &str) -> Result<Vec<HistoryEntry>, AiError> {
        if !self.registry.contains(thread_id).await {
            warn!(thread_id, "history requested for unknown thread");
            return Err(AiError::UntrackedThread(thread_id.to_string()));
        }
        debug!(thread_id, "loading thread history");
        self.session()
            .get_thread_history(Some(thread_id), DEFAULT_HISTORY_LIMIT)
            .await
    }

    /// Threads seen by `send`, most recently created first.
    pub async fn threads(&self) -> Vec<ThreadRecord> {
        self.registry.list().await
    }
}
