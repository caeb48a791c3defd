//! Error types for Solidafy Ingest
//!
//! This module defines the error hierarchy for the whole ingestion job.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Fetch and normalization failures have their own enums so the pipeline
//! can tell transport problems from rejected queries and schema mismatches
//! without string matching.

use serde_json::Value;
use thiserror::Error;

/// The main error type for Solidafy Ingest
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Source Errors
    // ============================================================================
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Failed to extract records: {message}")]
    RecordExtraction { message: String },

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    // ============================================================================
    // Arrow/Parquet Errors
    // ============================================================================
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Output error: {message}")]
    Output { message: String },

    // ============================================================================
    // Catalog / Storage Errors
    // ============================================================================
    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("Catalog error: {message}")]
    Catalog { message: String },

    #[error("Invalid table identifier '{identifier}': {message}")]
    InvalidIdentifier { identifier: String, message: String },

    #[error("Table '{table}' not found")]
    TableNotFound { table: String },

    #[error("Commit conflict on '{table}': version {version} already exists")]
    CommitConflict { table: String, version: u64 },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a record extraction error
    pub fn extraction(message: impl Into<String>) -> Self {
        Self::RecordExtraction {
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Create a catalog error
    pub fn catalog(message: impl Into<String>) -> Self {
        Self::Catalog {
            message: message.into(),
        }
    }

    /// Create an invalid identifier error
    pub fn invalid_identifier(identifier: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            identifier: identifier.into(),
            message: message.into(),
        }
    }

    /// Check if this error came from the transport layer
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Fetch(FetchError::Transport(_)))
    }

    /// Check if the source rejected the query
    pub fn is_query_rejected(&self) -> bool {
        matches!(self, Error::Fetch(FetchError::QueryRejected { .. }))
    }
}

/// Failure to obtain a payload from the source API
#[derive(Error, Debug)]
pub enum FetchError {
    /// Timeout, connection failure, non-success status or unreadable body
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The response was well-formed but carried a non-empty `errors` list
    #[error("Query rejected by source: {errors}")]
    QueryRejected { errors: Value },
}

/// Transport-level failure details
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("failed to decode response body: {message}")]
    Decode { message: String },
}

impl TransportError {
    /// Create a status error
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }
}

/// A record value could not be coerced to its schema kind
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("Field '{field}' expected {expected} but found {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
    },
}

/// Result type alias for Solidafy Ingest
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_field("endpoint");
        assert_eq!(err.to_string(), "Missing required config field: endpoint");

        let err = Error::from(FetchError::from(TransportError::status(500, "boom")));
        assert_eq!(err.to_string(), "Transport error: HTTP 500: boom");
    }

    #[test]
    fn test_fetch_classification() {
        let transport: Error = FetchError::from(TransportError::Timeout { timeout_ms: 30_000 }).into();
        assert!(transport.is_transport());
        assert!(!transport.is_query_rejected());

        let rejected: Error = FetchError::QueryRejected {
            errors: json!([{"message": "Cannot query field"}]),
        }
        .into();
        assert!(rejected.is_query_rejected());
        assert!(!rejected.is_transport());

        assert!(!Error::catalog("x").is_transport());
    }

    #[test]
    fn test_normalize_error_display() {
        let err = NormalizeError::TypeMismatch {
            field: "id".to_string(),
            expected: "integer".to_string(),
            found: "string".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Field 'id' expected integer but found string"
        );
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}
