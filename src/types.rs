//! Common types used throughout Solidafy Ingest
//!
//! This module contains the tagged value types that carry source data
//! through the pipeline: dynamically-typed [`FieldValue`]s inside
//! [`RawRecord`]s on the way in, and [`ScalarValue`]s once a record has
//! been normalized against its schema.

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt::Write as _;

// ============================================================================
// Field Values
// ============================================================================

/// A dynamically-typed value as returned by the source API
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Object(IndexMap<String, FieldValue>),
    Array(Vec<FieldValue>),
}

impl FieldValue {
    /// Short name of the runtime kind, used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Boolean(_) => "boolean",
            FieldValue::Integer(_) => "integer",
            FieldValue::Float(_) => "float",
            FieldValue::String(_) => "string",
            FieldValue::Object(_) => "object",
            FieldValue::Array(_) => "array",
        }
    }

    /// Whether this is a nested object or array
    pub fn is_compound(&self) -> bool {
        matches!(self, FieldValue::Object(_) | FieldValue::Array(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Serialize to canonical JSON: object keys sorted at every depth,
    /// no whitespace, array order preserved.
    pub fn to_canonical_string(&self) -> String {
        let mut out = String::new();
        self.write_canonical(&mut out);
        out
    }

    fn write_canonical(&self, out: &mut String) {
        match self {
            FieldValue::Null => out.push_str("null"),
            FieldValue::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
            FieldValue::Integer(i) => {
                let _ = write!(out, "{i}");
            }
            FieldValue::Float(f) => match serde_json::Number::from_f64(*f) {
                Some(n) => {
                    let _ = write!(out, "{n}");
                }
                None => out.push_str("null"),
            },
            FieldValue::String(s) => write_json_string(s, out),
            FieldValue::Array(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    item.write_canonical(out);
                }
                out.push(']');
            }
            FieldValue::Object(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                out.push('{');
                for (i, key) in keys.into_iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    write_json_string(key, out);
                    out.push(':');
                    map[key.as_str()].write_canonical(out);
                }
                out.push('}');
            }
        }
    }

    /// Convert back to a JSON value (key order preserved)
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Boolean(b) => Value::Bool(*b),
            FieldValue::Integer(i) => Value::from(*i),
            FieldValue::Float(f) => serde_json::Number::from_f64(*f).map_or(Value::Null, Value::Number),
            FieldValue::String(s) => Value::String(s.clone()),
            FieldValue::Array(items) => Value::Array(items.iter().map(FieldValue::to_json).collect()),
            FieldValue::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

fn write_json_string(s: &str, out: &mut String) {
    // serde_json never fails to serialize a str
    match serde_json::to_string(s) {
        Ok(quoted) => out.push_str(&quoted),
        Err(_) => out.push_str("\"\""),
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Boolean(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Integer(i),
                // u64 beyond i64::MAX and real numbers both land here
                None => FieldValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => FieldValue::String(s),
            Value::Array(items) => {
                FieldValue::Array(items.into_iter().map(FieldValue::from).collect())
            }
            Value::Object(map) => FieldValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, FieldValue::from(v)))
                    .collect(),
            ),
        }
    }
}

// ============================================================================
// Raw Records
// ============================================================================

/// One source record: field name to value, in the order the source sent them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    fields: IndexMap<String, FieldValue>,
}

impl RawRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from a JSON object; `None` for any other JSON kind
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self {
                fields: map
                    .into_iter()
                    .map(|(k, v)| (k, FieldValue::from(v)))
                    .collect(),
            }),
            _ => None,
        }
    }

    /// Insert or replace a field, keeping the original position on replace
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl FromIterator<(String, FieldValue)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

// ============================================================================
// Scalar Values
// ============================================================================

/// A value after normalization: never nested
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Timestamp(DateTime<Utc>),
}

impl ScalarValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }

    /// JSON form, timestamps as RFC 3339 with microseconds
    pub fn to_json(&self) -> Value {
        match self {
            ScalarValue::Null => Value::Null,
            ScalarValue::Boolean(b) => Value::Bool(*b),
            ScalarValue::Integer(i) => Value::from(*i),
            ScalarValue::Float(f) => {
                serde_json::Number::from_f64(*f).map_or(Value::Null, Value::Number)
            }
            ScalarValue::String(s) => Value::String(s.clone()),
            ScalarValue::Timestamp(ts) => {
                Value::String(ts.to_rfc3339_opts(SecondsFormat::Micros, true))
            }
        }
    }

    /// Back to a field value; timestamps become their RFC 3339 string
    pub fn to_field_value(&self) -> FieldValue {
        match self {
            ScalarValue::Null => FieldValue::Null,
            ScalarValue::Boolean(b) => FieldValue::Boolean(*b),
            ScalarValue::Integer(i) => FieldValue::Integer(*i),
            ScalarValue::Float(f) => FieldValue::Float(*f),
            ScalarValue::String(s) => FieldValue::String(s.clone()),
            ScalarValue::Timestamp(ts) => {
                FieldValue::String(ts.to_rfc3339_opts(SecondsFormat::Micros, true))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_value_from_json() {
        assert_eq!(FieldValue::from(json!(null)), FieldValue::Null);
        assert_eq!(FieldValue::from(json!(7)), FieldValue::Integer(7));
        assert_eq!(FieldValue::from(json!(1.5)), FieldValue::Float(1.5));
        assert_eq!(FieldValue::from(json!(true)), FieldValue::Boolean(true));
        assert_eq!(
            FieldValue::from(json!("x")),
            FieldValue::String("x".to_string())
        );
        assert!(FieldValue::from(json!({"a": 1})).is_compound());
        assert!(FieldValue::from(json!([1, 2])).is_compound());
    }

    #[test]
    fn test_large_unsigned_becomes_float() {
        let value = FieldValue::from(json!(u64::MAX));
        assert_eq!(value.kind_name(), "float");
    }

    #[test]
    fn test_canonical_string_sorts_keys() {
        let a = FieldValue::from(json!({"b": 1, "a": {"z": [1, 2], "y": null}}));
        let b = FieldValue::from(json!({"a": {"y": null, "z": [1, 2]}, "b": 1}));
        assert_eq!(a.to_canonical_string(), r#"{"a":{"y":null,"z":[1,2]},"b":1}"#);
        assert_eq!(a.to_canonical_string(), b.to_canonical_string());
    }

    #[test]
    fn test_canonical_string_escapes() {
        let value = FieldValue::from(json!(["quote\"d", "tab\t"]));
        assert_eq!(value.to_canonical_string(), r#"["quote\"d","tab\t"]"#);
    }

    #[test]
    fn test_raw_record_preserves_order() {
        let record = RawRecord::from_json(json!({"zeta": 1, "alpha": 2, "mid": 3})).unwrap();
        let keys: Vec<&str> = record.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_raw_record_rejects_non_objects() {
        assert!(RawRecord::from_json(json!([1, 2])).is_none());
        assert!(RawRecord::from_json(json!("x")).is_none());
    }

    #[test]
    fn test_scalar_timestamp_json() {
        let ts = DateTime::parse_from_rfc3339("2024-03-05T07:08:09.123456Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(
            ScalarValue::Timestamp(ts).to_json(),
            json!("2024-03-05T07:08:09.123456Z")
        );
    }
}
