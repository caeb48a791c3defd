//! Tests for output module

use super::*;
use crate::normalize::{IngestionMetadata, Normalizer, METADATA_COLUMNS};
use crate::schema::{infer_schema, InferredSchema, ScalarKind};
use crate::types::RawRecord;
use arrow::datatypes::{DataType, TimeUnit};
use chrono::{TimeZone, Utc};
use parquet::basic::Compression;
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::tempdir;

fn metadata() -> IngestionMetadata {
    let ts = Utc.with_ymd_and_hms(2024, 11, 2, 22, 15, 0).unwrap();
    IngestionMetadata::new("shows", "jr_42", ts)
}

fn sample_records() -> Vec<RawRecord> {
    vec![
        RawRecord::from_json(json!({
            "id": 1, "title": "Alpha", "rating": 7.5, "active": true, "genres": ["drama"]
        }))
        .unwrap(),
        RawRecord::from_json(json!({
            "id": 2, "title": null, "rating": 8.25, "active": false, "genres": []
        }))
        .unwrap(),
    ]
}

// ============================================================================
// Schema Mapping Tests
// ============================================================================

#[test]
fn test_arrow_type_mapping() {
    assert_eq!(arrow_type(ScalarKind::String), DataType::Utf8);
    assert_eq!(arrow_type(ScalarKind::Integer), DataType::Int64);
    assert_eq!(arrow_type(ScalarKind::Float), DataType::Float64);
    assert_eq!(arrow_type(ScalarKind::Boolean), DataType::Boolean);
}

#[test]
fn test_table_schema_appends_metadata_columns() {
    let schema = InferredSchema::new()
        .with_field("id", ScalarKind::Integer)
        .with_field("title", ScalarKind::String);

    let arrow = table_arrow_schema(&schema);
    let names: Vec<&str> = arrow.fields().iter().map(|f| f.name().as_str()).collect();

    let mut expected = vec!["id", "title"];
    expected.extend(METADATA_COLUMNS);
    assert_eq!(names, expected);
    assert!(arrow.fields().iter().all(|f| f.is_nullable()));

    let ts = arrow.field_with_name("ingestion_timestamp").unwrap();
    assert_eq!(
        ts.data_type(),
        &DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into()))
    );
    assert_eq!(
        arrow.field_with_name("year").unwrap().data_type(),
        &DataType::Utf8
    );
}

#[test]
fn test_table_schema_skips_reserved_source_fields() {
    let schema = InferredSchema::new()
        .with_field("day", ScalarKind::Integer)
        .with_field("name", ScalarKind::String);

    let arrow = table_arrow_schema(&schema);
    assert_eq!(arrow.fields().len(), 1 + METADATA_COLUMNS.len());
    assert_eq!(
        arrow.field_with_name("day").unwrap().data_type(),
        &DataType::Utf8
    );
}

// ============================================================================
// Record Conversion Tests
// ============================================================================

#[test]
fn test_records_to_batch_and_back() {
    let records = sample_records();
    let schema = infer_schema(&records).unwrap();
    let normalized = Normalizer::new(&schema, metadata())
        .normalize_all(&records)
        .unwrap();

    let arrow = table_arrow_schema(&schema);
    let batch = records_to_batch(&normalized, &arrow).unwrap();
    assert_eq!(batch.num_rows(), 2);
    assert_eq!(batch.num_columns(), 5 + METADATA_COLUMNS.len());

    let rows = arrow_to_json(&batch).unwrap();
    assert_eq!(rows[0], normalized[0].to_json());
    assert_eq!(rows[1], normalized[1].to_json());
    assert_eq!(rows[1]["title"], serde_json::Value::Null);
    assert_eq!(rows[0]["genres"], json!("[\"drama\"]"));
    assert_eq!(rows[0]["ingestion_timestamp"], json!("2024-11-02T22:15:00.000000Z"));
}

#[test]
fn test_records_to_batch_empty() {
    let arrow = table_arrow_schema(&InferredSchema::new().with_field("id", ScalarKind::Integer));
    let batch = records_to_batch::<crate::normalize::NormalizedRecord>(&[], &arrow).unwrap();
    assert_eq!(batch.num_rows(), 0);
    assert_eq!(batch.num_columns(), 1 + METADATA_COLUMNS.len());
}

#[test]
fn test_records_to_batch_rejects_wrong_kind() {
    let records = vec![RawRecord::from_json(json!({"id": 1})).unwrap()];
    let normalized = Normalizer::new(&infer_schema(&records).unwrap(), metadata())
        .normalize_all(&records)
        .unwrap();

    let wrong = table_arrow_schema(&InferredSchema::new().with_field("id", ScalarKind::String));
    let err = records_to_batch(&normalized, &wrong).unwrap_err();
    assert!(err.to_string().contains("column 'id' expected string"));
}

// ============================================================================
// Parquet Tests
// ============================================================================

#[test]
fn test_parquet_config_defaults_to_snappy() {
    let config = ParquetWriterConfig::default();
    assert_eq!(config.compression(), Compression::SNAPPY);
    assert_eq!(config.codec_name(), "snappy");
    assert_eq!(config.row_group_size(), 1024 * 1024);
    assert!(config.is_statistics_enabled());
}

#[test]
fn test_parquet_config_builder() {
    let config = ParquetWriterConfig::new()
        .with_compression(Compression::UNCOMPRESSED)
        .with_row_group_size(10)
        .with_statistics(false);
    assert_eq!(config.codec_name(), "uncompressed");
    assert_eq!(config.row_group_size(), 10);
    assert!(!config.is_statistics_enabled());
}

fn sample_batch() -> arrow::record_batch::RecordBatch {
    let records = sample_records();
    let schema = infer_schema(&records).unwrap();
    let normalized = Normalizer::new(&schema, metadata())
        .normalize_all(&records)
        .unwrap();
    records_to_batch(&normalized, &table_arrow_schema(&schema)).unwrap()
}

#[test]
fn test_encode_decode_parquet_in_memory() {
    let batch = sample_batch();

    let bytes = encode_parquet(&batch, &ParquetWriterConfig::default()).unwrap();
    let decoded = decode_parquet(bytes).unwrap();

    let rows: Vec<_> = decoded
        .iter()
        .flat_map(|b| arrow_to_json(b).unwrap())
        .collect();
    assert_eq!(rows, arrow_to_json(&batch).unwrap());
}

#[test]
fn test_encoded_file_uses_configured_codec() {
    let batch = sample_batch();

    let snappy = encode_parquet(&batch, &ParquetWriterConfig::default()).unwrap();
    assert_eq!(parquet_codec(snappy).unwrap(), Some("snappy"));

    let plain = ParquetWriterConfig::new().with_compression(Compression::UNCOMPRESSED);
    let bytes = encode_parquet(&batch, &plain).unwrap();
    assert_eq!(parquet_codec(bytes).unwrap(), Some("uncompressed"));
}

#[test]
fn test_decode_rejects_non_parquet() {
    let err = decode_parquet(bytes::Bytes::from_static(b"not parquet")).unwrap_err();
    assert!(err.to_string().contains("Parquet error"));
}

// ============================================================================
// Warehouse Tests
// ============================================================================

#[test]
fn test_partition_dir() {
    let meta = metadata();
    assert_eq!(
        build_partition_dir(&[meta.year(), meta.month(), meta.day()]),
        "year=2024/month=11/day=02"
    );
}

#[test]
fn test_parse_local_warehouse() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("wh");
    let warehouse = Warehouse::parse(path.to_str().unwrap()).unwrap();
    assert_eq!(warehouse.scheme(), "file");
    assert!(path.exists());
}

#[test]
fn test_parse_memory_warehouse() {
    let warehouse = Warehouse::parse("memory://").unwrap();
    assert_eq!(warehouse.scheme(), "memory");
}

#[test]
fn test_parse_file_url_warehouse() {
    let temp_dir = tempdir().unwrap();
    let path = temp_dir.path().join("lake");
    let warehouse = Warehouse::parse(&format!("file://{}", path.display())).unwrap();
    assert_eq!(warehouse.scheme(), "file");
    assert!(path.exists());
}

#[test]
fn test_parse_rejects_unknown_scheme() {
    let err = Warehouse::parse("ftp://host/lake").unwrap_err();
    assert!(err.to_string().contains("unsupported scheme 'ftp'"));
}

#[test]
fn test_parse_rejects_missing_bucket() {
    let err = Warehouse::parse("s3:///lake").unwrap_err();
    assert!(err.to_string().contains("missing bucket"));
}

#[test]
fn test_warehouse_path_prefix() {
    let warehouse = Warehouse::in_memory();
    assert_eq!(warehouse.path("/db/t/metadata").as_ref(), "db/t/metadata");
    assert_eq!(warehouse.url("db/t"), "memory://db/t");
}

#[tokio::test]
async fn test_warehouse_write_and_read() {
    let temp_dir = tempdir().unwrap();
    let warehouse = Warehouse::parse(temp_dir.path().to_str().unwrap()).unwrap();

    let url = warehouse
        .write("db/t/data/file.bin", bytes::Bytes::from_static(b"abc"))
        .await
        .unwrap();
    assert_eq!(url, "file://db/t/data/file.bin");
    assert!(temp_dir.path().join("db/t/data/file.bin").exists());

    let data = warehouse.read("db/t/data/file.bin").await.unwrap();
    assert_eq!(data.as_ref(), b"abc");
}
