//! Schema inference tests

use super::*;
use crate::types::{FieldValue, RawRecord};
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;

fn record(value: serde_json::Value) -> RawRecord {
    RawRecord::from_json(value).unwrap()
}

#[test]
fn test_infer_mixed_sample() {
    let records = vec![record(json!({
        "a": "x",
        "b": 7,
        "c": 1.5,
        "d": true,
        "e": {"n": 1},
        "f": [1, 2],
        "g": null
    }))];

    let schema = infer_schema(&records).unwrap();

    assert_eq!(
        schema.pairs(),
        vec![
            ("a", ScalarKind::String),
            ("b", ScalarKind::Integer),
            ("c", ScalarKind::Float),
            ("d", ScalarKind::Boolean),
            ("e", ScalarKind::String),
            ("f", ScalarKind::String),
            ("g", ScalarKind::String),
        ]
    );
}

#[test]
fn test_infer_empty_records() {
    assert!(infer_schema(&[]).is_none());
}

#[test]
fn test_infer_only_first_record() {
    let records = vec![
        record(json!({"id": 1})),
        record(json!({"id": "two", "extra": true})),
    ];

    let schema = infer_schema(&records).unwrap();
    assert_eq!(schema.pairs(), vec![("id", ScalarKind::Integer)]);
}

#[test]
fn test_infer_keeps_key_order() {
    let records = vec![record(json!({"zeta": 1, "alpha": "a", "mid": false}))];
    let schema = infer_schema(&records).unwrap();
    let names: Vec<&str> = schema.fields().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["zeta", "alpha", "mid"]);
}

#[test]
fn test_infer_empty_sample_gives_empty_schema() {
    let schema = infer_schema(&[RawRecord::new()]).unwrap();
    assert!(schema.is_empty());
}

#[test_case(FieldValue::String("s".into()), ScalarKind::String ; "string")]
#[test_case(FieldValue::Integer(-3), ScalarKind::Integer ; "integer")]
#[test_case(FieldValue::Float(0.25), ScalarKind::Float ; "float")]
#[test_case(FieldValue::Boolean(false), ScalarKind::Boolean ; "boolean")]
#[test_case(FieldValue::Null, ScalarKind::String ; "null")]
#[test_case(FieldValue::Array(vec![]), ScalarKind::String ; "array")]
#[test_case(FieldValue::Object(Default::default()), ScalarKind::String ; "object")]
fn test_kind_of(value: FieldValue, expected: ScalarKind) {
    assert_eq!(kind_of(&value), expected);
}

#[test]
fn test_schema_push_replaces_duplicate() {
    let schema = InferredSchema::new()
        .with_field("a", ScalarKind::Integer)
        .with_field("b", ScalarKind::String)
        .with_field("a", ScalarKind::Float);

    assert_eq!(
        schema.pairs(),
        vec![("a", ScalarKind::Float), ("b", ScalarKind::String)]
    );
}

#[test]
fn test_schema_display() {
    let schema = InferredSchema::new()
        .with_field("id", ScalarKind::Integer)
        .with_field("title", ScalarKind::String);
    assert_eq!(schema.to_string(), "[id: integer, title: string]");
}

#[test]
fn test_schema_serializes() {
    let schema = InferredSchema::new().with_field("id", ScalarKind::Integer);
    let value = serde_json::to_value(&schema).unwrap();
    assert_eq!(value, json!({"fields": [{"name": "id", "kind": "integer"}]}));
}
