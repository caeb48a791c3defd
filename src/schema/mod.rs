//! Schema inference module
//!
//! Derives an ordered field → kind schema from sampled data.
//!
//! # Policy
//!
//! - **Single Sample**: only the first record of a dataset is inspected
//! - **Key Order**: fields keep the sample record's key order
//! - **Scalar Kinds**: string, integer, float and boolean map to themselves;
//!   nested objects, arrays and nulls become strings

mod inference;
mod types;

pub use inference::{infer_from_sample, infer_schema, kind_of};
pub use types::{InferredSchema, ScalarKind, SchemaField};

#[cfg(test)]
mod tests;
