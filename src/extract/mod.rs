//! Record extraction module
//!
//! Turns the `data` object of a query response into a list of raw records.
//!
//! # Rules
//!
//! 1. An absent or empty payload means "no data"
//! 2. A payload with exactly one key is unwrapped to the value under that key;
//!    any other payload is taken whole as a single record
//! 3. An empty extracted value means "no data"
//! 4. A non-list value is wrapped in a one-element list
//!
//! Query envelopes usually expose exactly one named result field, so the
//! single-key rule finds the records without naming that field per dataset.

mod envelope;

pub use envelope::{extract, is_empty_value};

#[cfg(test)]
mod tests;
