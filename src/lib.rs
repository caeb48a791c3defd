// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Solidafy Ingest
//!
//! Batch ingestion from a query API into partitioned analytical tables.
//! The schema is not known ahead of time; it is inferred from the first
//! record of every dataset on every run.
//!
//! ## Features
//!
//! - **Query Fetching**: One POST per dataset, fixed 30s timeout, no retries
//! - **Envelope Unwrapping**: Single named result sets are unwrapped without
//!   naming them in config
//! - **Schema Inference**: String, integer, float and boolean columns from a
//!   sample record; nested values become canonical JSON strings
//! - **Full-Replace Tables**: Parquet (SNAPPY) snapshots partitioned by
//!   ingestion date, committed atomically on any `object_store` backend
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use solidafy_ingest::{config::JobConfig, engine::run_job, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = JobConfig::from_file("config/job.example.yaml")?;
//!     let summary = run_job(&config).await?;
//!     println!("{}", summary.outcome);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                 Orchestrator (one dataset at a time)              │
//! └───────────────────────────────────────────────────────────────────┘
//!                                 │
//! ┌─────────┬──────────┬──────────┴──┬─────────────┬──────────────────┐
//! │  Fetch  │ Extract  │   Schema    │  Normalize  │  Catalog/Output  │
//! ├─────────┼──────────┼─────────────┼─────────────┼──────────────────┤
//! │ POST    │ Envelope │ First-record│ Coerce      │ Arrow → Parquet  │
//! │ Timeout │ Unwrap   │ Kinds       │ Metadata    │ Replace snapshot │
//! └─────────┴──────────┴─────────────┴─────────────┴──────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Field values and raw records
pub mod types;

/// Job configuration
pub mod config;

/// HTTP transport
pub mod http;

/// Query fetching
pub mod fetch;

/// Envelope unwrapping
pub mod extract;

/// Schema inference from a sample record
pub mod schema;

/// Record normalization and ingestion metadata
pub mod normalize;

/// Arrow/Parquet encoding and warehouse storage
pub mod output;

/// Table catalog and session handle
pub mod catalog;

/// Pipeline orchestration
pub mod engine;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::{DatasetSpec, JobConfig};
pub use engine::{run_job, JobOutcome, JobSummary};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
