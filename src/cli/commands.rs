//! CLI commands and argument parsing

use crate::config::{parse_key_value, JobConfig};
use crate::error::{Error, Result};
use clap::{Args, Parser, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;

/// Solidafy Ingest CLI
#[derive(Parser, Debug)]
#[command(name = "solidafy-ingest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the ingestion job
    Run {
        #[command(flatten)]
        source: ConfigSource,

        /// Run identifier (defaults to the configured one, then "manual")
        #[arg(long)]
        job_run_id: Option<String>,

        /// Override the warehouse root
        /// Supports: /path, s3://bucket/path, r2://bucket/path, gs://bucket/path, az://container/path
        #[arg(long)]
        warehouse: Option<String>,

        /// Also write the job summary to this local file
        #[arg(long)]
        summary: Option<PathBuf>,
    },

    /// Load and validate the job configuration
    Validate {
        #[command(flatten)]
        source: ConfigSource,
    },

    /// Print rows of a table's current snapshot as JSON lines
    Sample {
        /// Warehouse root holding the table
        #[arg(long)]
        warehouse: String,

        /// Table identifier: <catalog>.<database>.<table>
        #[arg(long)]
        table: String,

        /// Maximum rows to print
        #[arg(long, default_value = "3")]
        limit: usize,
    },
}

/// Where the job configuration comes from
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigSource {
    /// Job configuration file (YAML)
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Job argument as KEY=VALUE (JOB_NAME, GRAPHQL_ENDPOINT, S3_BUCKET, ...)
    #[arg(long = "arg", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub args: Vec<(String, String)>,
}

impl ConfigSource {
    /// Load and validate the configuration
    pub fn load(&self) -> Result<JobConfig> {
        match (&self.config, self.args.is_empty()) {
            (Some(_), false) => Err(Error::config("use either --config or --arg, not both")),
            (Some(path), true) => JobConfig::from_file(path),
            (None, false) => {
                let args: HashMap<String, String> = self.args.iter().cloned().collect();
                JobConfig::from_job_args(&args)
            }
            (None, true) => Err(Error::config(
                "no job configuration given (use --config FILE or --arg KEY=VALUE)",
            )),
        }
    }
}
