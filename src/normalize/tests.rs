//! Tests for normalization

use super::*;
use crate::error::NormalizeError;
use crate::schema::{infer_schema, InferredSchema, ScalarKind};
use crate::types::{RawRecord, ScalarValue};
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;

fn record(value: serde_json::Value) -> RawRecord {
    RawRecord::from_json(value).unwrap()
}

fn metadata() -> IngestionMetadata {
    let ts = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
    IngestionMetadata::new("shows", "jr_1", ts)
}

#[test]
fn test_metadata_partition_components_are_zero_padded() {
    let meta = metadata();
    assert_eq!(meta.year(), "2024");
    assert_eq!(meta.month(), "03");
    assert_eq!(meta.day(), "05");
}

#[test]
fn test_metadata_truncates_to_micros() {
    let ts = Utc.timestamp_nanos(1_700_000_000_123_456_789);
    let meta = IngestionMetadata::new("shows", "manual", ts);
    assert_eq!(
        meta.ingestion_timestamp().timestamp_nanos_opt(),
        Some(1_700_000_000_123_456_000)
    );
}

#[test]
fn test_normalize_scalars_and_compounds() {
    let sample = record(json!({
        "a": "x",
        "b": 7,
        "c": 1.5,
        "d": true,
        "e": {"n": 1, "m": [2, 1]},
        "f": [1, 2],
        "g": null
    }));
    let schema = infer_schema(std::slice::from_ref(&sample)).unwrap();
    let normalizer = Normalizer::new(&schema, metadata());

    let out = normalizer.normalize(&sample).unwrap();

    assert_eq!(
        out.to_json(),
        json!({
            "a": "x",
            "b": 7,
            "c": 1.5,
            "d": true,
            "e": "{\"m\":[2,1],\"n\":1}",
            "f": "[1,2]",
            "g": null,
            "ingestion_timestamp": "2024-03-05T07:08:09.000000Z",
            "source": "graphql_api",
            "data_type": "shows",
            "job_run_id": "jr_1",
            "year": "2024",
            "month": "03",
            "day": "05"
        })
    );
}

#[test]
fn test_normalize_column_order() {
    let schema = InferredSchema::new()
        .with_field("title", ScalarKind::String)
        .with_field("id", ScalarKind::Integer);
    let normalizer = Normalizer::new(&schema, metadata());

    let out = normalizer
        .normalize(&record(json!({"id": 1, "title": "A"})))
        .unwrap();

    let mut expected = vec!["title", "id"];
    expected.extend(METADATA_COLUMNS);
    assert_eq!(out.column_names(), expected);
}

#[test]
fn test_normalize_missing_field_is_null() {
    let schema = InferredSchema::new()
        .with_field("id", ScalarKind::Integer)
        .with_field("title", ScalarKind::String);
    let normalizer = Normalizer::new(&schema, metadata());

    let out = normalizer.normalize(&record(json!({"id": 3}))).unwrap();
    assert_eq!(out.get("title"), Some(&ScalarValue::Null));
}

#[test]
fn test_normalize_drops_unknown_fields() {
    let schema = InferredSchema::new().with_field("id", ScalarKind::Integer);
    let normalizer = Normalizer::new(&schema, metadata());

    let out = normalizer
        .normalize(&record(json!({"id": 3, "surprise": "x"})))
        .unwrap();
    assert!(out.get("surprise").is_none());
}

#[test]
fn test_normalize_null_passes_any_kind() {
    let schema = InferredSchema::new()
        .with_field("i", ScalarKind::Integer)
        .with_field("f", ScalarKind::Float)
        .with_field("b", ScalarKind::Boolean);
    let normalizer = Normalizer::new(&schema, metadata());

    let out = normalizer
        .normalize(&record(json!({"i": null, "f": null, "b": null})))
        .unwrap();
    assert!(out.get("i").unwrap().is_null());
    assert!(out.get("f").unwrap().is_null());
    assert!(out.get("b").unwrap().is_null());
}

#[test]
fn test_normalize_type_mismatch_fails() {
    let schema = InferredSchema::new().with_field("id", ScalarKind::Integer);
    let normalizer = Normalizer::new(&schema, metadata());

    let err = normalizer
        .normalize(&record(json!({"id": "seven"})))
        .unwrap_err();
    assert_eq!(
        err,
        NormalizeError::TypeMismatch {
            field: "id".to_string(),
            expected: "integer".to_string(),
            found: "string".to_string(),
        }
    );
}

#[test]
fn test_normalize_integer_in_float_column_fails() {
    let schema = InferredSchema::new().with_field("rating", ScalarKind::Float);
    let normalizer = Normalizer::new(&schema, metadata());
    assert!(normalizer.normalize(&record(json!({"rating": 3}))).is_err());
}

#[test]
fn test_normalize_nested_in_integer_column_fails() {
    let schema = InferredSchema::new().with_field("id", ScalarKind::Integer);
    let normalizer = Normalizer::new(&schema, metadata());
    assert!(normalizer.normalize(&record(json!({"id": [1]}))).is_err());
}

#[test]
fn test_normalize_all_stops_at_first_mismatch() {
    let records = vec![
        record(json!({"id": 1})),
        record(json!({"id": "2"})),
        record(json!({"id": 3})),
    ];
    let schema = infer_schema(&records).unwrap();
    let normalizer = Normalizer::new(&schema, metadata());
    assert!(normalizer.normalize_all(&records).is_err());
}

#[test]
fn test_normalize_is_idempotent() {
    let records = vec![
        record(json!({"id": 1, "tags": ["b", "a"], "meta": {"z": 1, "a": {"y": 2, "b": 3}}, "note": null})),
        record(json!({"id": 2, "tags": [], "meta": {}, "note": "n"})),
    ];
    let schema = infer_schema(&records).unwrap();
    let normalizer = Normalizer::new(&schema, metadata());

    for raw in &records {
        let once = normalizer.normalize(raw).unwrap();
        let twice = normalizer.normalize(&once.to_raw_record()).unwrap();
        assert_eq!(
            serde_json::to_string(&once.to_json()).unwrap(),
            serde_json::to_string(&twice.to_json()).unwrap()
        );
    }
}

#[test]
fn test_normalize_same_value_different_key_order() {
    let schema = InferredSchema::new().with_field("meta", ScalarKind::String);
    let normalizer = Normalizer::new(&schema, metadata());

    let a = normalizer
        .normalize(&record(json!({"meta": {"b": 1, "a": 2}})))
        .unwrap();
    let b = normalizer
        .normalize(&record(json!({"meta": {"a": 2, "b": 1}})))
        .unwrap();
    assert_eq!(a.get("meta"), b.get("meta"));
}

#[test]
fn test_reserved_field_is_replaced_by_metadata() {
    let schema = InferredSchema::new()
        .with_field("id", ScalarKind::Integer)
        .with_field("source", ScalarKind::String);
    let normalizer = Normalizer::new(&schema, metadata());

    let out = normalizer
        .normalize(&record(json!({"id": 1, "source": "upstream"})))
        .unwrap();

    assert_eq!(
        out.get("source"),
        Some(&ScalarValue::String(SOURCE_NAME.to_string()))
    );
    assert_eq!(out.column_names().iter().filter(|n| **n == "source").count(), 1);
    assert_eq!(data_fields(&schema).len(), 1);
}

#[test]
fn test_all_records_share_one_partition() {
    let records = vec![record(json!({"id": 1})), record(json!({"id": 2}))];
    let schema = infer_schema(&records).unwrap();
    let normalizer = Normalizer::new(&schema, IngestionMetadata::now("shows", "manual"));

    let out = normalizer.normalize_all(&records).unwrap();
    assert_eq!(out[0].get(COL_INGESTION_TIMESTAMP), out[1].get(COL_INGESTION_TIMESTAMP));
    assert_eq!(out[0].get(COL_DAY), out[1].get(COL_DAY));
}
