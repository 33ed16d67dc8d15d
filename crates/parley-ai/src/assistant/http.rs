//! `AssistantBackend` over the provider's HTTPS API.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::provider::{check_status, ProviderSettings};
use crate::{AiError, Role};

use super::backend::AssistantBackend;
use super::types::{AssistantInfo, ListOrder, Run, Thread, ThreadMessage, WireMessage};

const ASSISTANTS_BETA_HEADER: (&str, &str) = ("OpenAI-Beta", "assistants=v2");

#[derive(Deserialize)]
struct MessageList {
    data: Vec<WireMessage>,
}

/// HTTP implementation of the assistant transport.
pub struct HttpAssistantBackend {
    settings: ProviderSettings,
    http: reqwest::Client,
}

impl std::fmt::Debug for HttpAssistantBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpAssistantBackend")
            .field("settings", &self.settings)
            .finish()
    }
}

impl HttpAssistantBackend {
    /// Create a backend. Fails with `MissingCredential` if the key is blank.
    pub fn new(settings: ProviderSettings) -> Result<Self, AiError> {
        settings.ensure_credential()?;
        let http = settings.build_http_client()?;
        Ok(Self { settings, http })
    }

    fn request(
        &self,
        method: reqwest::Method,
        segments: &[&str],
    ) -> Result<reqwest::RequestBuilder, AiError> {
        let url = self.settings.endpoint(segments)?;
        debug!(method = %method, path = url.path(), "assistant request");
        Ok(self
            .http
            .request(method, url)
            .bearer_auth(&self.settings.api_key)
            .header(ASSISTANTS_BETA_HEADER.0, ASSISTANTS_BETA_HEADER.1))
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, AiError> {
        let response = check_status(builder.send().await?).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| AiError::upstream(format!("invalid response body: {e}")))
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, AiError> {
        self.execute(self.request(reqwest::Method::GET, segments)?)
            .await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: serde_json::Value,
    ) -> Result<T, AiError> {
        self.execute(self.request(reqwest::Method::POST, segments)?.json(&body))
            .await
    }
}

#[async_trait]
impl AssistantBackend for HttpAssistantBackend {
    async fn create_thread(&self) -> Result<Thread, AiError> {
        self.post(&["threads"], serde_json::json!({})).await
    }

    async fn retrieve_thread(&self, thread_id: &str) -> Result<Thread, AiError> {
        self.get(&["threads", thread_id]).await
    }

    async fn create_message(
        &self,
        thread_id: &str,
        role: Role,
        content: &str,
    ) -> Result<ThreadMessage, AiError> {
        let wire: WireMessage = self
            .post(
                &["threads", thread_id, "messages"],
                serde_json::json!({ "role": role, "content": content }),
            )
            .await?;
        Ok(wire.into())
    }

    async fn list_messages(
        &self,
        thread_id: &str,
        limit: u32,
        order: ListOrder,
    ) -> Result<Vec<ThreadMessage>, AiError> {
        debug!(thread_id, limit, order = order.as_str(), "listing thread messages");
        let builder = self
            .request(reqwest::Method::GET, &["threads", thread_id, "messages"])?
            .query(&[("limit", limit.to_string()), ("order", order.as_str().to_string())]);
        let list: MessageList = self.execute(builder).await?;
        Ok(list.data.into_iter().map(ThreadMessage::from).collect())
    }

    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run, AiError> {
        self.post(
            &["threads", thread_id, "runs"],
            serde_json::json!({ "assistant_id": assistant_id }),
        )
        .await
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run, AiError> {
        self.get(&["threads", thread_id, "runs", run_id]).await
    }

    async fn retrieve_assistant(&self, assistant_id: &str) -> Result<AssistantInfo, AiError> {
        self.get(&["assistants", assistant_id]).await
    }
}
