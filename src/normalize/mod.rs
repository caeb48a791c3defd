//! Normalization module
//!
//! Coerces raw records into their dataset's inferred schema and appends the
//! ingestion metadata columns.
//!
//! # Overview
//!
//! - Every schema field is read from the record (absent fields become null)
//! - Nested objects and arrays in string columns become canonical JSON
//! - Any other kind disagreement is a [`NormalizeError`](crate::error::NormalizeError)
//! - `ingestion_timestamp`, `source`, `data_type`, `job_run_id`, `year`,
//!   `month` and `day` are appended, identical for the whole run

mod normalizer;
mod types;

pub use normalizer::{coerce, data_fields, Normalizer};
pub use types::{
    is_reserved, IngestionMetadata, NormalizedRecord, COL_DATA_TYPE, COL_DAY,
    COL_INGESTION_TIMESTAMP, COL_JOB_RUN_ID, COL_MONTH, COL_SOURCE, COL_YEAR, METADATA_COLUMNS,
    PARTITION_COLUMNS, SOURCE_NAME,
};

#[cfg(test)]
mod tests;
