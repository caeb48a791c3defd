//! Execution engine module
//!
//! Runs the ingestion pipeline once per configured dataset.
//!
//! # Overview
//!
//! The engine module provides:
//! - `Orchestrator` - Drives fetch, extract, infer, normalize and write for
//!   each dataset in order and applies the partial-failure policy
//! - `run_job` - Opens the catalog session, runs the orchestrator and always
//!   invokes the completion hook
//! - Outcome types (`DatasetOutcome`, `JobOutcome`, `JobSummary`)
//!
//! A dataset with no data is skipped. Any other failure aborts the job and
//! no later dataset is attempted.

mod types;

pub use types::{
    DatasetOutcome, DatasetReport, DatasetState, FailureReason, JobOutcome, JobSummary,
    SkipReason, VERIFY_SAMPLE_ROWS,
};

use crate::catalog::{CatalogSession, TableIdentifier};
use crate::config::{DatasetSpec, JobConfig};
use crate::error::Result;
use crate::extract::extract;
use crate::fetch::QueryFetcher;
use crate::normalize::{IngestionMetadata, Normalizer};
use crate::schema::infer_schema;
use chrono::Utc;
use std::time::Instant;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// Sequential per-dataset pipeline driver
pub struct Orchestrator<'a> {
    config: &'a JobConfig,
    fetcher: QueryFetcher,
    session: &'a CatalogSession,
}

impl<'a> Orchestrator<'a> {
    /// Create an orchestrator sharing one session across datasets
    pub fn new(config: &'a JobConfig, fetcher: QueryFetcher, session: &'a CatalogSession) -> Self {
        Self {
            config,
            fetcher,
            session,
        }
    }

    /// Run every dataset in order and decide the job outcome
    pub async fn run(&self) -> JobSummary {
        let started_at = Utc::now();
        let mut reports = Vec::with_capacity(self.config.datasets.len());
        let mut fatal = None;

        for spec in &self.config.datasets {
            if fatal.is_some() {
                reports.push(DatasetReport::pending(&spec.name, &spec.table));
                continue;
            }

            let span = info_span!("dataset", dataset = %spec.name, table = %spec.table);
            let start = Instant::now();
            let outcome = self.run_dataset(spec).instrument(span).await;
            let duration_ms = start.elapsed().as_millis() as u64;

            let report = DatasetReport::finished(&spec.name, &spec.table, &outcome, duration_ms);
            if outcome.is_fatal() {
                let message = report.message.clone().unwrap_or_default();
                error!(dataset = %spec.name, error = %message, "Dataset failed, aborting job");
                fatal = Some((spec.name.clone(), message));
            }
            reports.push(report);
        }

        let outcome = JobOutcome::decide(&reports, fatal);
        match &outcome {
            JobOutcome::Succeeded { skipped } if !skipped.is_empty() => {
                warn!(skipped = ?skipped, "Job succeeded but some datasets had no data");
            }
            JobOutcome::Succeeded { .. } => info!("Job succeeded"),
            JobOutcome::Failed { reason } => error!(reason = %reason, "Job failed"),
        }

        JobSummary {
            job_name: self.config.job_name.clone(),
            job_run_id: self.config.run_id().to_string(),
            started_at,
            finished_at: Utc::now(),
            outcome,
            datasets: reports,
        }
    }

    /// Run one dataset to a terminal outcome
    pub async fn run_dataset(&self, spec: &DatasetSpec) -> DatasetOutcome {
        let mut state = DatasetState::Pending;
        let outcome = match self.pipeline(spec, &mut state).await {
            Ok(outcome) => outcome,
            Err(e) => DatasetOutcome::Failed(e),
        };
        state.transition(outcome.state());

        match &outcome {
            DatasetOutcome::Succeeded { rows_written } => {
                info!(rows = rows_written, "Dataset written");
            }
            DatasetOutcome::SkippedNoData { reason } => {
                warn!(reason = %reason, "Dataset skipped");
            }
            DatasetOutcome::Failed(_) => {}
        }
        outcome
    }

    async fn pipeline(&self, spec: &DatasetSpec, state: &mut DatasetState) -> Result<DatasetOutcome> {
        state.transition(DatasetState::Fetching);
        let payload = self.fetcher.fetch(&spec.query).await?;

        state.transition(DatasetState::Extracting);
        let Some(records) = extract(payload)? else {
            return Ok(DatasetOutcome::SkippedNoData {
                reason: SkipReason::NoRecords,
            });
        };
        debug!(records = records.len(), "Extracted records");

        state.transition(DatasetState::Inferring);
        let Some(schema) = infer_schema(&records) else {
            return Ok(DatasetOutcome::SkippedNoData {
                reason: SkipReason::NoRecords,
            });
        };
        if schema.is_empty() {
            return Ok(DatasetOutcome::SkippedNoData {
                reason: SkipReason::EmptySchema,
            });
        }
        info!(fields = schema.len(), schema = %schema, "Inferred schema");

        state.transition(DatasetState::Normalizing);
        let metadata = IngestionMetadata::now(&spec.name, self.config.run_id());
        let normalizer = Normalizer::new(&schema, metadata);
        let rows = normalizer.normalize_all(&records)?;

        state.transition(DatasetState::Writing);
        let ident = self.session.table_identifier(&spec.table)?;
        let result = self.session.replace_table(&ident, &schema, &rows).await?;

        self.verify(&ident).await;

        Ok(DatasetOutcome::Succeeded {
            rows_written: result.rows_written,
        })
    }

    /// Read a few rows back for the log; failures only warn
    async fn verify(&self, ident: &TableIdentifier) {
        match self.session.read_sample(ident, VERIFY_SAMPLE_ROWS).await {
            Ok(rows) => {
                for row in rows {
                    info!(row = %row, "Sample row");
                }
            }
            Err(e) => warn!(table = %ident, error = %e, "Verification read failed"),
        }
    }
}

/// Run a whole job
///
/// The catalog session is opened once and closed on every exit path. An
/// error is returned only when the job cannot start or the completion hook
/// fails; dataset failures are reported in the summary.
pub async fn run_job(config: &JobConfig) -> Result<JobSummary> {
    config.validate()?;
    let fetcher = QueryFetcher::new(&config.endpoint)?;
    let session = CatalogSession::open(config)?;

    info!(
        job = %config.job_name,
        run_id = %config.run_id(),
        datasets = config.datasets.len(),
        "Starting job"
    );

    let summary = Orchestrator::new(config, fetcher, &session).run().await;

    if let Err(e) = session.close(&summary).await {
        error!(error = %e, "Job completion hook failed");
        return Err(e);
    }

    Ok(summary)
}
