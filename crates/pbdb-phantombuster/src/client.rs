//! HTTP client for the `PhantomBuster` v2 REST API.
//!
//! Wraps `reqwest` with API key management, transient-failure retry, and
//! typed response deserialization. Non-2xx responses surface as
//! [`PhantomBusterError::Status`] carrying the HTTP reason and, when the body
//! has one, the API's own `error` message.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::PhantomBusterError;
use crate::retry::retry_with_backoff;
use crate::types::{
    AgentDetail, AgentRef, ContainerDetail, ContainerListResponse, ContainerRef,
    ResultObjectResponse,
};

const DEFAULT_BASE_URL: &str = "https://api.phantombuster.com/api/v2/";
const API_KEY_HEADER: &str = "X-Phantombuster-Key";
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_BACKOFF_BASE_MS: u64 = 1_000;

/// Client for the `PhantomBuster` REST API.
///
/// Use [`PhantomBusterClient::new`] for production or
/// [`PhantomBusterClient::with_base_url`] to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct PhantomBusterClient {
    client: Client,
    base_url: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl PhantomBusterClient {
    /// Creates a new client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`PhantomBusterError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`PhantomBusterError::InvalidConfig`] if the
    /// API key cannot be sent as a header.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, PhantomBusterError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns [`PhantomBusterError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`PhantomBusterError::InvalidConfig`] if
    /// `base_url` is not a valid URL or the API key is not a valid header value.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, PhantomBusterError> {
        let mut key = HeaderValue::from_str(api_key).map_err(|_| {
            PhantomBusterError::InvalidConfig("API key contains invalid header characters".into())
        })?;
        key.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, key);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("pbdb/0.1 (activity-sync)")
            .default_headers(headers)
            .build()?;

        // Relative joins replace the last path segment unless the base ends in '/'.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| {
            PhantomBusterError::InvalidConfig(format!("invalid base URL '{base_url}': {e}"))
        })?;

        Ok(Self {
            client,
            base_url,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
        })
    }

    /// Overrides the transient-failure retry policy.
    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Lists every agent visible to the API key.
    ///
    /// # Errors
    ///
    /// - [`PhantomBusterError::Status`] on a non-2xx response.
    /// - [`PhantomBusterError::Http`] on network failure.
    /// - [`PhantomBusterError::Deserialize`] if the body is not an agent array.
    pub async fn list_agents(&self) -> Result<Vec<AgentRef>, PhantomBusterError> {
        let url = self.build_url("agents/fetch-all", &[])?;
        self.get_json(&url, "agents/fetch-all").await
    }

    /// Fetches one agent's full record.
    ///
    /// # Errors
    ///
    /// Same as [`PhantomBusterClient::list_agents`].
    pub async fn fetch_agent(&self, agent_id: &str) -> Result<AgentDetail, PhantomBusterError> {
        let url = self.build_url("agents/fetch", &[("id", agent_id)])?;
        self.get_json(&url, &format!("agents/fetch(id={agent_id})"))
            .await
    }

    /// Lists every container (run) of one agent, each tagged with `agent_id`.
    ///
    /// # Errors
    ///
    /// Same as [`PhantomBusterClient::list_agents`].
    pub async fn list_containers(
        &self,
        agent_id: &str,
    ) -> Result<Vec<ContainerRef>, PhantomBusterError> {
        let url = self.build_url("containers/fetch-all", &[("agentId", agent_id)])?;
        let envelope: ContainerListResponse = self
            .get_json(&url, &format!("containers/fetch-all(agentId={agent_id})"))
            .await?;

        Ok(envelope
            .containers
            .into_iter()
            .map(|c| ContainerRef {
                id: c.id,
                agent_id: agent_id.to_owned(),
                status: c.status,
            })
            .collect())
    }

    /// Fetches one container's full record.
    ///
    /// # Errors
    ///
    /// Same as [`PhantomBusterClient::list_agents`].
    pub async fn fetch_container(
        &self,
        container_id: &str,
    ) -> Result<ContainerDetail, PhantomBusterError> {
        let url = self.build_url("containers/fetch", &[("id", container_id)])?;
        self.get_json(&url, &format!("containers/fetch(id={container_id})"))
            .await
    }

    /// Downloads the raw records produced by one container.
    ///
    /// A missing, `null`, or blank `resultObject` means the run produced
    /// nothing and yields an empty list.
    ///
    /// # Errors
    ///
    /// - [`PhantomBusterError::Status`] / [`PhantomBusterError::Http`] as above.
    /// - [`PhantomBusterError::Deserialize`] if `resultObject` is not a JSON
    ///   array encoded as a string.
    pub async fn get_result(&self, container_id: &str) -> Result<Vec<Value>, PhantomBusterError> {
        let context = format!("containers/fetch-result-object(id={container_id})");
        let url = self.build_url("containers/fetch-result-object", &[("id", container_id)])?;
        let envelope: ResultObjectResponse = self.get_json(&url, &context).await?;
        decode_result_object(envelope.result_object.as_deref(), &context)
    }

    /// Joins `path` onto the base URL and appends percent-encoded query pairs.
    fn build_url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, PhantomBusterError> {
        let mut url = self.base_url.join(path).map_err(|e| {
            PhantomBusterError::InvalidConfig(format!("cannot join '{path}' onto base URL: {e}"))
        })?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<T, PhantomBusterError> {
        let body = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.request_text(url, context)
        })
        .await?;

        serde_json::from_str(&body).map_err(|e| PhantomBusterError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }

    /// Sends a GET request and returns the body of a 2xx response.
    async fn request_text(&self, url: &Url, context: &str) -> Result<String, PhantomBusterError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let reason = api_error_message(&body)
                .or_else(|| status.canonical_reason().map(str::to_owned))
                .unwrap_or_else(|| "unknown error".to_owned());
            return Err(PhantomBusterError::Status {
                status: status.as_u16(),
                reason,
                context: context.to_owned(),
            });
        }

        Ok(body)
    }
}

/// Decodes the string-encoded `resultObject` payload.
fn decode_result_object(raw: Option<&str>, context: &str) -> Result<Vec<Value>, PhantomBusterError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(Vec::new());
    };

    serde_json::from_str::<Option<Vec<Value>>>(raw)
        .map(Option::unwrap_or_default)
        .map_err(|e| PhantomBusterError::Deserialize {
            context: format!("{context} resultObject"),
            source: e,
        })
}

/// Extracts `{"error": "..."}` from an error body, if present.
fn api_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("error")
        .and_then(Value::as_str)
        .map(str::to_owned)
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
