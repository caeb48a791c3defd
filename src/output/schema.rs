//! Arrow table schema and record conversion
//!
//! Maps an inferred dataset schema plus the metadata columns onto an Arrow
//! schema, and converts normalized records to and from RecordBatches.

use crate::error::{Error, Result};
use crate::normalize::{data_fields, NormalizedRecord, COL_INGESTION_TIMESTAMP, METADATA_COLUMNS};
use crate::schema::{InferredSchema, ScalarKind};
use crate::types::ScalarValue;
use arrow::array::{
    Array, ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray,
    TimestampMicrosecondArray,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, SecondsFormat};
use serde_json::Value;
use std::borrow::Borrow;
use std::sync::Arc;

/// Arrow type for a scalar kind
pub fn arrow_type(kind: ScalarKind) -> DataType {
    match kind {
        ScalarKind::String => DataType::Utf8,
        ScalarKind::Integer => DataType::Int64,
        ScalarKind::Float => DataType::Float64,
        ScalarKind::Boolean => DataType::Boolean,
    }
}

fn timestamp_type() -> DataType {
    DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into()))
}

/// Build the table schema: data columns then metadata columns
///
/// Every column is nullable.
pub fn table_arrow_schema(schema: &InferredSchema) -> Schema {
    let mut fields: Vec<Field> = data_fields(schema)
        .into_iter()
        .map(|f| Field::new(&f.name, arrow_type(f.kind), true))
        .collect();

    for name in METADATA_COLUMNS {
        let dtype = if name == COL_INGESTION_TIMESTAMP {
            timestamp_type()
        } else {
            DataType::Utf8
        };
        fields.push(Field::new(name, dtype, true));
    }

    Schema::new(fields)
}

/// Convert normalized records to a RecordBatch in `schema`
pub fn records_to_batch<R: Borrow<NormalizedRecord>>(
    records: &[R],
    schema: &Schema,
) -> Result<RecordBatch> {
    let schema = Arc::new(schema.clone());
    if records.is_empty() {
        return Ok(RecordBatch::new_empty(schema));
    }

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len());

    for field in schema.fields() {
        let values: Vec<Option<&ScalarValue>> =
            records.iter().map(|r| r.borrow().get(field.name())).collect();
        columns.push(build_array(field.name(), &values, field.data_type())?);
    }

    RecordBatch::try_new(schema, columns).map_err(|e| Error::Output {
        message: format!("Failed to create RecordBatch: {e}"),
    })
}

fn mismatch(column: &str, expected: &str, found: &ScalarValue) -> Error {
    Error::output(format!(
        "column '{column}' expected {expected}, found {found:?}"
    ))
}

/// Build an Arrow array from scalar values
fn build_array(
    column: &str,
    values: &[Option<&ScalarValue>],
    data_type: &DataType,
) -> Result<ArrayRef> {
    match data_type {
        DataType::Boolean => {
            let arr = values
                .iter()
                .map(|v| match v {
                    None | Some(ScalarValue::Null) => Ok(None),
                    Some(ScalarValue::Boolean(b)) => Ok(Some(*b)),
                    Some(other) => Err(mismatch(column, "boolean", other)),
                })
                .collect::<Result<BooleanArray>>()?;
            Ok(Arc::new(arr))
        }

        DataType::Int64 => {
            let arr = values
                .iter()
                .map(|v| match v {
                    None | Some(ScalarValue::Null) => Ok(None),
                    Some(ScalarValue::Integer(i)) => Ok(Some(*i)),
                    Some(other) => Err(mismatch(column, "integer", other)),
                })
                .collect::<Result<Int64Array>>()?;
            Ok(Arc::new(arr))
        }

        DataType::Float64 => {
            let arr = values
                .iter()
                .map(|v| match v {
                    None | Some(ScalarValue::Null) => Ok(None),
                    Some(ScalarValue::Float(f)) => Ok(Some(*f)),
                    Some(other) => Err(mismatch(column, "float", other)),
                })
                .collect::<Result<Float64Array>>()?;
            Ok(Arc::new(arr))
        }

        DataType::Utf8 => {
            let arr = values
                .iter()
                .map(|v| match v {
                    None | Some(ScalarValue::Null) => Ok(None),
                    Some(ScalarValue::String(s)) => Ok(Some(s.as_str())),
                    Some(other) => Err(mismatch(column, "string", other)),
                })
                .collect::<Result<StringArray>>()?;
            Ok(Arc::new(arr))
        }

        DataType::Timestamp(TimeUnit::Microsecond, tz) => {
            let arr = values
                .iter()
                .map(|v| match v {
                    None | Some(ScalarValue::Null) => Ok(None),
                    Some(ScalarValue::Timestamp(ts)) => Ok(Some(ts.timestamp_micros())),
                    Some(other) => Err(mismatch(column, "timestamp", other)),
                })
                .collect::<Result<TimestampMicrosecondArray>>()?
                .with_timezone_opt(tz.clone());
            Ok(Arc::new(arr))
        }

        other => Err(Error::output(format!(
            "column '{column}' has unsupported type {other}"
        ))),
    }
}

/// Convert an Arrow RecordBatch to JSON records
///
/// Returns a vector of JSON objects, one per row, in column order.
pub fn arrow_to_json(batch: &RecordBatch) -> Result<Vec<Value>> {
    let schema = batch.schema();
    let num_rows = batch.num_rows();
    let mut records = Vec::with_capacity(num_rows);

    for row_idx in 0..num_rows {
        let mut record = serde_json::Map::new();

        for (col_idx, field) in schema.fields().iter().enumerate() {
            let column = batch.column(col_idx);
            let value = array_value_to_json(column.as_ref(), row_idx)?;
            record.insert(field.name().clone(), value);
        }

        records.push(Value::Object(record));
    }

    Ok(records)
}

fn downcast<'a, T: 'static>(array: &'a dyn Array, name: &str) -> Result<&'a T> {
    array
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| Error::Output {
            message: format!("Failed to downcast to {name}"),
        })
}

/// Convert a single array element to JSON
fn array_value_to_json(array: &dyn Array, row: usize) -> Result<Value> {
    if array.is_null(row) {
        return Ok(Value::Null);
    }

    match array.data_type() {
        DataType::Null => Ok(Value::Null),

        DataType::Boolean => {
            let arr = downcast::<BooleanArray>(array, "BooleanArray")?;
            Ok(Value::Bool(arr.value(row)))
        }

        DataType::Int64 => {
            let arr = downcast::<Int64Array>(array, "Int64Array")?;
            Ok(Value::Number(arr.value(row).into()))
        }

        DataType::Float64 => {
            let arr = downcast::<Float64Array>(array, "Float64Array")?;
            let val = arr.value(row);
            Ok(serde_json::Number::from_f64(val).map_or(Value::Null, Value::Number))
        }

        DataType::Utf8 => {
            let arr = downcast::<StringArray>(array, "StringArray")?;
            Ok(Value::String(arr.value(row).to_string()))
        }

        DataType::Timestamp(TimeUnit::Microsecond, _) => {
            let arr = downcast::<TimestampMicrosecondArray>(array, "TimestampMicrosecondArray")?;
            let micros = arr.value(row);
            let ts = DateTime::from_timestamp_micros(micros).ok_or_else(|| Error::Output {
                message: format!("Timestamp out of range: {micros}"),
            })?;
            Ok(Value::String(
                ts.to_rfc3339_opts(SecondsFormat::Micros, true),
            ))
        }

        other => Err(Error::output(format!("unsupported column type {other}"))),
    }
}
