//! Schema inference from a sample record

use super::types::{InferredSchema, ScalarKind};
use crate::types::{FieldValue, RawRecord};

/// Infer a schema from the first record of `records`
///
/// Returns `None` for an empty slice. Later records are not inspected; they
/// are checked against the result during normalization.
pub fn infer_schema(records: &[RawRecord]) -> Option<InferredSchema> {
    let sample = records.first()?;
    Some(infer_from_sample(sample))
}

/// Infer a schema from one record, in the record's key order
pub fn infer_from_sample(sample: &RawRecord) -> InferredSchema {
    let mut schema = InferredSchema::new();
    for (name, value) in sample.iter() {
        schema.push(name.clone(), kind_of(value));
    }
    schema
}

/// Column kind for a single value
///
/// Compound values are serialized later, and a null carries no type
/// information, so all of them become strings.
pub fn kind_of(value: &FieldValue) -> ScalarKind {
    match value {
        FieldValue::String(_) => ScalarKind::String,
        FieldValue::Integer(_) => ScalarKind::Integer,
        FieldValue::Float(_) => ScalarKind::Float,
        FieldValue::Boolean(_) => ScalarKind::Boolean,
        FieldValue::Object(_) | FieldValue::Array(_) | FieldValue::Null => ScalarKind::String,
    }
}
