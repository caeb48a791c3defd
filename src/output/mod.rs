//! Output module
//!
//! Handles Arrow RecordBatch creation, Parquet encoding and warehouse storage.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Mapping inferred dataset schemas to Arrow schemas
//! - Converting normalized records to Arrow RecordBatches and back to JSON
//! - Encoding Parquet (SNAPPY by default)
//! - Object storage for the warehouse (S3, R2, GCS, Azure, local)

mod cloud;
mod schema;
mod writer;

pub use cloud::{build_partition_dir, Warehouse};
pub use schema::{arrow_to_json, arrow_type, records_to_batch, table_arrow_schema};
pub use writer::{decode_parquet, encode_parquet, parquet_codec, ParquetWriterConfig};

#[cfg(test)]
mod tests;
