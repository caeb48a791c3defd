//! Tests for record extraction

use super::*;
use crate::types::FieldValue;
use serde_json::json;
use test_case::test_case;

#[test]
fn test_single_key_list_is_unwrapped() {
    let records = extract(json!({
        "shows": [
            {"id": 1, "title": "A"},
            {"id": 2, "title": "B"}
        ]
    }))
    .unwrap()
    .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].get("id"), Some(&FieldValue::Integer(1)));
    assert_eq!(
        records[1].get("title"),
        Some(&FieldValue::String("B".to_string()))
    );
}

#[test]
fn test_single_key_object_is_wrapped() {
    let records = extract(json!({"show": {"id": 9, "title": "Solo"}}))
        .unwrap()
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("id"), Some(&FieldValue::Integer(9)));
}

#[test]
fn test_multi_key_payload_is_one_record() {
    let records = extract(json!({
        "shows": [{"id": 1}],
        "episodes": [{"id": 2}]
    }))
    .unwrap()
    .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].len(), 2);
    assert!(records[0].get("shows").unwrap().is_compound());
    assert!(records[0].get("episodes").unwrap().is_compound());
}

#[test_case(json!(null) ; "null payload")]
#[test_case(json!({}) ; "empty object")]
#[test_case(json!({"shows": []}) ; "single key empty list")]
#[test_case(json!({"shows": null}) ; "single key null")]
#[test_case(json!({"shows": {}}) ; "single key empty object")]
#[test_case(json!({"shows": ""}) ; "single key empty string")]
fn test_no_data(payload: serde_json::Value) {
    assert!(extract(payload).unwrap().is_none());
}

#[test]
fn test_bare_list_payload() {
    let records = extract(json!([{"id": 1}, {"id": 2}, {"id": 3}]))
        .unwrap()
        .unwrap();
    assert_eq!(records.len(), 3);
}

#[test]
fn test_non_object_elements_fail() {
    let err = extract(json!({"ids": [1, 2, 3]})).unwrap_err();
    assert!(err
        .to_string()
        .contains("element 0 is a number, expected an object"));
}

#[test]
fn test_record_field_order_preserved() {
    let records = extract(json!({"shows": [{"title": "A", "id": 1, "aired": true}]}))
        .unwrap()
        .unwrap();
    let keys: Vec<&str> = records[0].iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec!["title", "id", "aired"]);
}

#[test]
fn test_is_empty_value() {
    assert!(is_empty_value(&json!(null)));
    assert!(is_empty_value(&json!("")));
    assert!(is_empty_value(&json!([])));
    assert!(is_empty_value(&json!({})));
    assert!(!is_empty_value(&json!(0)));
    assert!(!is_empty_value(&json!(false)));
    assert!(!is_empty_value(&json!([null])));
}
