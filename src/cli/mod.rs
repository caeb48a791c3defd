//! CLI module
//!
//! Command-line interface for running the ingestion job.
//!
//! # Commands
//!
//! - `run` - Run every configured dataset and write the tables
//! - `validate` - Load and validate the job configuration
//! - `sample` - Print rows from a table's current snapshot

mod commands;
mod runner;

pub use commands::{Cli, Commands, ConfigSource};
pub use runner::Runner;
