//! Table metadata documents
//!
//! One `v<N>.metadata.json` file per committed version. The version hint
//! names the current one; readers never look at anything else.

use crate::normalize::PARTITION_COLUMNS;
use crate::schema::ScalarKind;
use arrow::datatypes::{DataType, Schema};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const FORMAT_VERSION: u32 = 1;
pub const OPERATION_OVERWRITE: &str = "overwrite";

/// Column in the persisted table schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
    pub nullable: bool,
}

impl ColumnSpec {
    /// Describe an Arrow column
    pub fn from_arrow(name: &str, data_type: &DataType) -> Self {
        let column_type = match data_type {
            DataType::Int64 => ScalarKind::Integer.as_str(),
            DataType::Float64 => ScalarKind::Float.as_str(),
            DataType::Boolean => ScalarKind::Boolean.as_str(),
            DataType::Timestamp(_, _) => "timestamptz",
            _ => ScalarKind::String.as_str(),
        };
        Self {
            name: name.to_string(),
            column_type: column_type.to_string(),
            nullable: true,
        }
    }
}

/// Describe every column of an Arrow schema
pub fn columns_from_arrow(schema: &Schema) -> Vec<ColumnSpec> {
    schema
        .fields()
        .iter()
        .map(|f| ColumnSpec::from_arrow(f.name(), f.data_type()))
        .collect()
}

/// A Parquet file belonging to a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataFile {
    /// Warehouse-relative path
    pub path: String,
    /// Partition column values, e.g. `year -> 2024`
    pub partition: BTreeMap<String, String>,
    pub record_count: u64,
    pub file_size_bytes: u64,
}

/// Counts recorded with a snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SnapshotSummary {
    pub added_records: u64,
    pub added_data_files: u64,
}

/// The full contents of the table at one version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub snapshot_id: u64,
    pub timestamp_ms: i64,
    pub operation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_run_id: Option<String>,
    pub summary: SnapshotSummary,
    pub data_files: Vec<DataFile>,
}

impl Snapshot {
    pub fn record_count(&self) -> u64 {
        self.data_files.iter().map(|f| f.record_count).sum()
    }
}

/// Persisted table metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMetadata {
    pub format_version: u32,
    /// Fully qualified identifier at commit time
    pub identifier: String,
    /// Warehouse-relative table root
    pub location: String,
    /// Version number of this document
    pub version: u64,
    pub last_updated_ms: i64,
    pub schema: Vec<ColumnSpec>,
    pub partition_spec: Vec<String>,
    pub properties: BTreeMap<String, String>,
    pub current_snapshot: Snapshot,
}

impl TableMetadata {
    /// Column names in table order
    pub fn column_names(&self) -> Vec<&str> {
        self.schema.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Partition spec shared by every table
pub fn partition_spec() -> Vec<String> {
    PARTITION_COLUMNS.iter().map(ToString::to_string).collect()
}

/// Table properties for a given compression codec
pub fn table_properties(codec: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("write.format.default".to_string(), "parquet".to_string()),
        (
            "write.parquet.compression-codec".to_string(),
            codec.to_string(),
        ),
    ])
}

/// Location of the metadata document for `version`
pub fn metadata_file(table_location: &str, version: u64) -> String {
    format!("{table_location}/metadata/v{version}.metadata.json")
}

/// Location of the version hint
pub fn version_hint_file(table_location: &str) -> String {
    format!("{table_location}/metadata/version-hint.text")
}
