//! HTTP client for the source API
//!
//! Sends JSON POST requests with a bounded timeout and classifies every
//! non-success outcome as a [`TransportError`]. Each call is a single
//! attempt; a failed request is reported to the caller as-is.

use crate::config::FETCH_TIMEOUT;
use crate::error::{Error, Result, TransportError};
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: FETCH_TIMEOUT,
            user_agent: format!("solidafy-ingest/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Single-attempt JSON-over-HTTP client
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a client with the default fetch timeout
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// POST `body` as JSON to `url`
    ///
    /// Returns the response only for 2xx statuses.
    pub async fn post(
        &self,
        url: &str,
        body: &Value,
    ) -> std::result::Result<Response, TransportError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(%url, status = status.as_u16(), "Request failed");
            return Err(TransportError::status(status.as_u16(), body));
        }

        debug!(%url, status = status.as_u16(), "Request succeeded");
        Ok(response)
    }

    /// POST `body` and parse the response body as JSON
    pub async fn post_json(
        &self,
        url: &str,
        body: &Value,
    ) -> std::result::Result<Value, TransportError> {
        let response = self.post(url, body).await?;
        let text = response.text().await.map_err(|e| self.classify(e))?;
        serde_json::from_str(&text).map_err(|e| TransportError::Decode {
            message: format!("response is not valid JSON: {e}"),
        })
    }

    fn classify(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout {
                timeout_ms: self.config.timeout.as_millis() as u64,
            }
        } else {
            TransportError::Request(e)
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
