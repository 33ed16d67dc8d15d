//! Connection settings shared by every remote call.

use std::fmt;
use std::time::Duration;

use crate::AiError;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Base URL, bearer credential and timeouts for the provider API.
#[derive(Clone)]
pub struct ProviderSettings {
    pub base_url: String,
    pub api_key: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl ProviderSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
        }
    }

    /// Read the credential from the environment variable `var`.
    pub fn from_env(var: &str) -> Result<Self, AiError> {
        Self::from_lookup(var, |key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        var: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AiError> {
        match lookup(var) {
            Some(key) if !key.trim().is_empty() => Ok(Self::new(key.trim())),
            _ => Err(AiError::MissingCredential(format!(
                "{var} not found in environment variables"
            ))),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeouts(mut self, connect: Duration, request: Duration) -> Self {
        self.connect_timeout = connect;
        self.request_timeout = request;
        self
    }

    /// Fail fast when the credential is blank.
    pub(crate) fn ensure_credential(&self) -> Result<(), AiError> {
        if self.api_key.trim().is_empty() {
            return Err(AiError::MissingCredential("API key is empty".into()));
        }
        Ok(())
    }

    /// Append `segments` to the base URL, percent-encoding each one so an
    /// id can never change which endpoint is addressed.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<reqwest::Url, AiError> {
        let invalid = || AiError::InvalidRequest(format!("invalid base URL '{}'", self.base_url));
        let mut url = reqwest::Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) fn build_http_client(&self) -> Result<reqwest::Client, AiError> {
        reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout)
            .build()
            .map_err(|e| AiError::upstream(format!("failed to build HTTP client: {e}")))
    }
}

/// Turn a non-success response into an `AiError::Upstream`.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, AiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let err = AiError::http(status, &text);
    if err.is_rate_limited() {
        tracing::warn!(error = %err, "rate limited by provider");
    }
    Err(err)
}
