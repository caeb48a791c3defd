//! CLI runner - executes commands

use crate::catalog::{CatalogSession, TableIdentifier};
use crate::cli::commands::{Cli, Commands, ConfigSource};
use crate::engine::run_job;
use crate::output::Warehouse;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command and return the process exit code
    pub async fn run(&self) -> Result<ExitCode> {
        match &self.cli.command {
            Commands::Run {
                source,
                job_run_id,
                warehouse,
                summary,
            } => {
                self.run_job(
                    source,
                    job_run_id.as_deref(),
                    warehouse.as_deref(),
                    summary.as_ref(),
                )
                .await
            }
            Commands::Validate { source } => self.validate(source),
            Commands::Sample {
                warehouse,
                table,
                limit,
            } => self.sample(warehouse, table, *limit).await,
        }
    }

    async fn run_job(
        &self,
        source: &ConfigSource,
        job_run_id: Option<&str>,
        warehouse: Option<&str>,
        summary_path: Option<&PathBuf>,
    ) -> Result<ExitCode> {
        let mut config = source
            .load()
            .context("Failed to load job configuration")?;
        if let Some(run_id) = job_run_id {
            config = config.with_job_run_id(run_id);
        }
        if let Some(warehouse) = warehouse {
            config = config.with_warehouse(warehouse);
        }

        let summary = run_job(&config)
            .await
            .with_context(|| format!("Job '{}' did not complete", config.job_name))?;

        if let Some(path) = summary_path {
            write_summary(path, &serde_json::to_vec_pretty(&summary)?)?;
        }

        println!("{}", serde_json::to_string(&summary)?);
        Ok(ExitCode::from(summary.outcome.exit_code()))
    }

    fn validate(&self, source: &ConfigSource) -> Result<ExitCode> {
        let config = source
            .load()
            .context("Failed to load job configuration")?;

        println!("Configuration is valid");
        println!("  Job: {}", config.job_name);
        println!("  Endpoint: {}", config.endpoint);
        println!("  Warehouse: {}", config.warehouse);
        println!("  Run ID: {}", config.run_id());
        for dataset in &config.datasets {
            let ident = TableIdentifier::new(&config.catalog, &config.database, &dataset.table)?;
            println!("  Dataset {} -> {ident}", dataset.name);
        }
        Ok(ExitCode::SUCCESS)
    }

    async fn sample(&self, warehouse: &str, table: &str, limit: usize) -> Result<ExitCode> {
        let ident: TableIdentifier = table.parse()?;
        let warehouse = Warehouse::parse(warehouse)
            .with_context(|| format!("Failed to open warehouse {warehouse}"))?;
        let session = CatalogSession::reader(warehouse, &ident);

        let rows = session
            .read_sample(&ident, limit)
            .await
            .with_context(|| format!("Failed to read {ident}"))?;
        for row in &rows {
            println!("{}", serde_json::to_string(row)?);
        }
        info!(table = %ident, rows = rows.len(), "Sample read");
        Ok(ExitCode::SUCCESS)
    }
}

fn write_summary(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, data).with_context(|| format!("Failed to write summary {}", path.display()))?;
    info!(path = %path.display(), "Wrote job summary");
    Ok(())
}
