//! Query fetch module
//!
//! Sends one query per dataset to the source API and unwraps the response
//! envelope down to its `data` object.
//!
//! # Overview
//!
//! - A request is a single `POST` with body `{"query": ...}`
//! - Transport failures and non-2xx statuses become `FetchError::Transport`
//! - A non-empty top-level `errors` array becomes `FetchError::QueryRejected`
//! - A missing `data` member yields an empty object

mod client;

pub use client::QueryFetcher;
