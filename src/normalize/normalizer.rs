//! Record normalizer

use super::types::{is_reserved, IngestionMetadata, NormalizedRecord};
use crate::error::NormalizeError;
use crate::schema::{InferredSchema, ScalarKind, SchemaField};
use crate::types::{FieldValue, RawRecord, ScalarValue};
use tracing::warn;

/// Schema fields that become data columns
///
/// Fields sharing a name with a metadata column are dropped; the metadata
/// value takes their place.
pub fn data_fields(schema: &InferredSchema) -> Vec<&SchemaField> {
    schema
        .fields()
        .iter()
        .filter(|f| !is_reserved(&f.name))
        .collect()
}

/// Coerces records of one dataset run into a fixed schema
#[derive(Debug, Clone)]
pub struct Normalizer {
    fields: Vec<SchemaField>,
    metadata: IngestionMetadata,
}

impl Normalizer {
    /// Create a normalizer for one dataset run
    pub fn new(schema: &InferredSchema, metadata: IngestionMetadata) -> Self {
        for field in schema.fields().iter().filter(|f| is_reserved(&f.name)) {
            warn!(
                field = %field.name,
                "Source field collides with a metadata column and is replaced"
            );
        }

        Self {
            fields: data_fields(schema).into_iter().cloned().collect(),
            metadata,
        }
    }

    pub fn metadata(&self) -> &IngestionMetadata {
        &self.metadata
    }

    /// Normalize a single record
    pub fn normalize(&self, record: &RawRecord) -> Result<NormalizedRecord, NormalizeError> {
        let mut fields = Vec::with_capacity(self.fields.len() + 7);

        for field in &self.fields {
            let value = record.get(&field.name).unwrap_or(&FieldValue::Null);
            fields.push((field.name.clone(), coerce(&field.name, field.kind, value)?));
        }

        fields.extend(
            self.metadata
                .columns()
                .into_iter()
                .map(|(name, value)| (name.to_string(), value)),
        );

        Ok(NormalizedRecord::from_fields(fields))
    }

    /// Normalize every record, stopping at the first mismatch
    pub fn normalize_all(
        &self,
        records: &[RawRecord],
    ) -> Result<Vec<NormalizedRecord>, NormalizeError> {
        records.iter().map(|r| self.normalize(r)).collect()
    }
}

/// Coerce one value into `kind`
///
/// Nulls pass through. Nested values in a string column are serialized to
/// canonical JSON. Everything else must already match.
pub fn coerce(
    field: &str,
    kind: ScalarKind,
    value: &FieldValue,
) -> Result<ScalarValue, NormalizeError> {
    match (kind, value) {
        (_, FieldValue::Null) => Ok(ScalarValue::Null),
        (ScalarKind::String, FieldValue::String(s)) => Ok(ScalarValue::String(s.clone())),
        (ScalarKind::String, v @ (FieldValue::Object(_) | FieldValue::Array(_))) => {
            Ok(ScalarValue::String(v.to_canonical_string()))
        }
        (ScalarKind::Integer, FieldValue::Integer(i)) => Ok(ScalarValue::Integer(*i)),
        (ScalarKind::Float, FieldValue::Float(f)) => Ok(ScalarValue::Float(*f)),
        (ScalarKind::Boolean, FieldValue::Boolean(b)) => Ok(ScalarValue::Boolean(*b)),
        (kind, other) => Err(NormalizeError::TypeMismatch {
            field: field.to_string(),
            expected: kind.to_string(),
            found: other.kind_name().to_string(),
        }),
    }
}
