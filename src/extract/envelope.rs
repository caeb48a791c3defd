//! Envelope unwrapping

use crate::error::{Error, Result};
use crate::types::RawRecord;
use serde_json::Value;
use tracing::debug;

/// Extract raw records from a response payload
///
/// Returns `Ok(None)` when there is nothing to ingest. Fails only when the
/// extracted list holds something other than objects.
pub fn extract(payload: Value) -> Result<Option<Vec<RawRecord>>> {
    if is_empty_value(&payload) {
        debug!("Payload is empty");
        return Ok(None);
    }

    let extracted = match payload {
        Value::Object(map) if map.len() == 1 => match map.into_iter().next() {
            Some((key, value)) => {
                debug!(key = %key, "Unwrapping single-key payload");
                value
            }
            None => return Ok(None),
        },
        other => other,
    };

    if is_empty_value(&extracted) {
        debug!("Extracted value is empty");
        return Ok(None);
    }

    let items = match extracted {
        Value::Array(items) => items,
        other => vec![other],
    };

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let kind = json_kind(&item);
        let record = RawRecord::from_json(item).ok_or_else(|| {
            Error::extraction(format!("element {index} is a {kind}, expected an object"))
        })?;
        records.push(record);
    }

    Ok(Some(records))
}

/// Null, empty string, empty list and empty object count as empty
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
