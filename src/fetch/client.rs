//! Query API fetcher

use crate::error::{FetchError, Result, TransportError};
use crate::http::HttpClient;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

/// Fetches raw payloads from a query endpoint
#[derive(Debug)]
pub struct QueryFetcher {
    client: HttpClient,
    endpoint: String,
}

impl QueryFetcher {
    /// Create a fetcher for `endpoint` with the fixed fetch timeout
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: HttpClient::new()?,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run `query` and return the response's `data` object
    pub async fn fetch(&self, query: &str) -> std::result::Result<Value, FetchError> {
        info!(endpoint = %self.endpoint, "Fetching query results");

        let body = self
            .client
            .post_json(&self.endpoint, &json!({ "query": query }))
            .await?;

        unwrap_envelope(body)
    }
}

/// Split a response body into its `data` object or a rejection
pub(crate) fn unwrap_envelope(body: Value) -> std::result::Result<Value, FetchError> {
    let Value::Object(mut envelope) = body else {
        return Err(TransportError::Decode {
            message: "response body is not a JSON object".to_string(),
        }
        .into());
    };

    if let Some(errors) = envelope.remove("errors") {
        let rejected = match &errors {
            Value::Array(items) => !items.is_empty(),
            Value::Object(map) => !map.is_empty(),
            Value::Null => false,
            // Only a non-empty collection rejects the query
            other => {
                warn!(errors = %other, "Ignoring non-collection errors member");
                false
            }
        };
        if rejected {
            return Err(FetchError::QueryRejected { errors });
        }
    }

    match envelope.remove("data") {
        Some(Value::Null) | None => {
            debug!("Response carried no data member");
            Ok(Value::Object(Map::new()))
        }
        Some(data) => Ok(data),
    }
}
