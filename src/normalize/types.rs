//! Normalized record and ingestion metadata types

use crate::types::{RawRecord, ScalarValue};
use chrono::{DateTime, SubsecRound, Utc};
use serde_json::Value;

/// Value of the `source` column for every row
pub const SOURCE_NAME: &str = "graphql_api";

pub const COL_INGESTION_TIMESTAMP: &str = "ingestion_timestamp";
pub const COL_SOURCE: &str = "source";
pub const COL_DATA_TYPE: &str = "data_type";
pub const COL_JOB_RUN_ID: &str = "job_run_id";
pub const COL_YEAR: &str = "year";
pub const COL_MONTH: &str = "month";
pub const COL_DAY: &str = "day";

/// Metadata columns appended to every row, in order
pub const METADATA_COLUMNS: [&str; 7] = [
    COL_INGESTION_TIMESTAMP,
    COL_SOURCE,
    COL_DATA_TYPE,
    COL_JOB_RUN_ID,
    COL_YEAR,
    COL_MONTH,
    COL_DAY,
];

/// Partition columns, in order
pub const PARTITION_COLUMNS: [&str; 3] = [COL_YEAR, COL_MONTH, COL_DAY];

/// Whether `name` collides with a metadata column
pub fn is_reserved(name: &str) -> bool {
    METADATA_COLUMNS.contains(&name)
}

/// Per-run metadata shared by every record of one dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionMetadata {
    ingestion_timestamp: DateTime<Utc>,
    data_type: String,
    job_run_id: String,
}

impl IngestionMetadata {
    /// Capture metadata for a dataset run at `timestamp`
    ///
    /// The timestamp is truncated to microseconds, the precision it is
    /// stored with.
    pub fn new(
        data_type: impl Into<String>,
        job_run_id: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            ingestion_timestamp: timestamp.trunc_subsecs(6),
            data_type: data_type.into(),
            job_run_id: job_run_id.into(),
        }
    }

    /// Capture metadata for a dataset run starting now
    pub fn now(data_type: impl Into<String>, job_run_id: impl Into<String>) -> Self {
        Self::new(data_type, job_run_id, Utc::now())
    }

    pub fn ingestion_timestamp(&self) -> DateTime<Utc> {
        self.ingestion_timestamp
    }

    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    pub fn job_run_id(&self) -> &str {
        &self.job_run_id
    }

    pub fn year(&self) -> String {
        self.ingestion_timestamp.format("%Y").to_string()
    }

    pub fn month(&self) -> String {
        self.ingestion_timestamp.format("%m").to_string()
    }

    pub fn day(&self) -> String {
        self.ingestion_timestamp.format("%d").to_string()
    }

    /// Metadata columns as `(name, value)` pairs, in column order
    pub fn columns(&self) -> Vec<(&'static str, ScalarValue)> {
        vec![
            (
                COL_INGESTION_TIMESTAMP,
                ScalarValue::Timestamp(self.ingestion_timestamp),
            ),
            (COL_SOURCE, ScalarValue::String(SOURCE_NAME.to_string())),
            (COL_DATA_TYPE, ScalarValue::String(self.data_type.clone())),
            (COL_JOB_RUN_ID, ScalarValue::String(self.job_run_id.clone())),
            (COL_YEAR, ScalarValue::String(self.year())),
            (COL_MONTH, ScalarValue::String(self.month())),
            (COL_DAY, ScalarValue::String(self.day())),
        ]
    }
}

/// A record coerced to its schema, followed by the metadata columns
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    fields: Vec<(String, ScalarValue)>,
}

impl NormalizedRecord {
    pub(crate) fn from_fields(fields: Vec<(String, ScalarValue)>) -> Self {
        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&ScalarValue> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScalarValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// JSON object in column order
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(n, v)| (n.clone(), v.to_json()))
                .collect(),
        )
    }

    /// View as a raw record (timestamps rendered as strings)
    pub fn to_raw_record(&self) -> RawRecord {
        self.fields
            .iter()
            .map(|(n, v)| (n.clone(), v.to_field_value()))
            .collect()
    }
}
