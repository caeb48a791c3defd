//! HTTP client module
//!
//! Provides the transport used to talk to the source API.
//!
//! # Features
//!
//! - **Fixed Timeout**: Every request is bounded by the job's fetch timeout
//! - **Single Attempt**: No retries or backoff; failures surface immediately
//! - **Error Classification**: Timeouts, connection failures and non-2xx
//!   statuses map onto [`TransportError`](crate::error::TransportError)

mod client;

pub use client::{HttpClient, HttpClientConfig};
