//! Catalog module
//!
//! A minimal table format on top of `object_store`.
//!
//! # Layout
//!
//! ```text
//! <database>/<table>/metadata/v<N>.metadata.json
//! <database>/<table>/metadata/version-hint.text
//! <database>/<table>/data/<snapshot-id>/year=YYYY/month=MM/day=DD/part-00000.parquet
//! _jobs/<job_name>/<job_run_id>.json
//! ```
//!
//! Every write replaces the whole table. Readers resolve the version hint
//! and see exactly one snapshot.

mod identifier;
mod metadata;
mod session;

pub use identifier::{sanitize_name, TableIdentifier};
pub use metadata::{
    metadata_file, version_hint_file, ColumnSpec, DataFile, Snapshot, SnapshotSummary,
    TableMetadata,
};
pub use session::{CatalogSession, WriteResult};
