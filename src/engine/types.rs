//! Engine types
//!
//! Per-dataset states and outcomes, and the job summary written by the
//! completion hook.

use crate::error::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Rows read back after a successful write
pub const VERIFY_SAMPLE_ROWS: usize = 3;

/// Pipeline state of one dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetState {
    Pending,
    Fetching,
    Extracting,
    Inferring,
    Normalizing,
    Writing,
    Succeeded,
    SkippedNoData,
    Failed,
}

impl DatasetState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::Extracting => "extracting",
            Self::Inferring => "inferring",
            Self::Normalizing => "normalizing",
            Self::Writing => "writing",
            Self::Succeeded => "succeeded",
            Self::SkippedNoData => "skipped_no_data",
            Self::Failed => "failed",
        }
    }

    /// Move to `next`, emitting a debug event
    pub fn transition(&mut self, next: DatasetState) {
        debug!(from = %self, to = %next, "Dataset state transition");
        *self = next;
    }
}

impl fmt::Display for DatasetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a dataset was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The payload held no records
    NoRecords,
    /// The first record had no fields
    EmptySchema,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRecords => f.write_str("no records returned"),
            Self::EmptySchema => f.write_str("inferred schema is empty"),
        }
    }
}

/// Result of one dataset run
#[derive(Debug)]
pub enum DatasetOutcome {
    Succeeded { rows_written: u64 },
    SkippedNoData { reason: SkipReason },
    Failed(Error),
}

impl DatasetOutcome {
    /// Terminal state for this outcome
    pub fn state(&self) -> DatasetState {
        match self {
            Self::Succeeded { .. } => DatasetState::Succeeded,
            Self::SkippedNoData { .. } => DatasetState::SkippedNoData,
            Self::Failed(_) => DatasetState::Failed,
        }
    }

    /// Whether the job must stop after this dataset
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Per-dataset entry of the job summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetReport {
    pub dataset: String,
    pub table: String,
    pub state: DatasetState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows_written: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub duration_ms: u64,
}

impl DatasetReport {
    /// Report for a dataset that was never attempted
    pub fn pending(dataset: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            table: table.into(),
            state: DatasetState::Pending,
            rows_written: None,
            message: None,
            duration_ms: 0,
        }
    }

    /// Report for a finished dataset
    pub fn finished(
        dataset: impl Into<String>,
        table: impl Into<String>,
        outcome: &DatasetOutcome,
        duration_ms: u64,
    ) -> Self {
        let (rows_written, message) = match outcome {
            DatasetOutcome::Succeeded { rows_written } => (Some(*rows_written), None),
            DatasetOutcome::SkippedNoData { reason } => (None, Some(reason.to_string())),
            DatasetOutcome::Failed(error) => (None, Some(error.to_string())),
        };
        Self {
            dataset: dataset.into(),
            table: table.into(),
            state: outcome.state(),
            rows_written,
            message,
            duration_ms,
        }
    }
}

/// Why the job failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// A dataset hit a fatal error and the job was aborted
    Fatal { dataset: String, error: String },
    /// Every dataset was skipped
    NoDataProcessed,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fatal { dataset, error } => write!(f, "dataset '{dataset}' failed: {error}"),
            Self::NoDataProcessed => f.write_str("no data processed"),
        }
    }
}

/// Final job outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobOutcome {
    /// At least one dataset succeeded; `skipped` lists datasets without data
    Succeeded { skipped: Vec<String> },
    Failed { reason: FailureReason },
}

impl JobOutcome {
    /// Decide the job outcome from dataset reports
    ///
    /// `fatal` is the dataset that aborted the job, if any.
    pub fn decide(reports: &[DatasetReport], fatal: Option<(String, String)>) -> Self {
        if let Some((dataset, error)) = fatal {
            return Self::Failed {
                reason: FailureReason::Fatal { dataset, error },
            };
        }

        if reports.iter().any(|r| r.state == DatasetState::Succeeded) {
            let skipped = reports
                .iter()
                .filter(|r| r.state == DatasetState::SkippedNoData)
                .map(|r| r.dataset.clone())
                .collect();
            Self::Succeeded { skipped }
        } else {
            Self::Failed {
                reason: FailureReason::NoDataProcessed,
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    /// Process exit code for this outcome
    pub fn exit_code(&self) -> u8 {
        u8::from(!self.is_success())
    }
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded { skipped } if skipped.is_empty() => f.write_str("succeeded"),
            Self::Succeeded { skipped } => {
                write!(f, "succeeded (skipped: {})", skipped.join(", "))
            }
            Self::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

/// Summary of one job run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSummary {
    pub job_name: String,
    pub job_run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcome: JobOutcome,
    pub datasets: Vec<DatasetReport>,
}

impl JobSummary {
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }

    /// Total rows written across datasets
    pub fn rows_written(&self) -> u64 {
        self.datasets.iter().filter_map(|d| d.rows_written).sum()
    }

    /// Report for a dataset by name
    pub fn dataset(&self, name: &str) -> Option<&DatasetReport> {
        self.datasets.iter().find(|d| d.dataset == name)
    }
}
