//! Catalog session
//!
//! The single handle to the warehouse used for the whole job. Tables are
//! replaced atomically by writing a new snapshot's data files, creating the
//! next metadata version, and then moving the version hint to it.

use super::identifier::TableIdentifier;
use super::metadata::{
    columns_from_arrow, metadata_file, partition_spec, table_properties, version_hint_file,
    DataFile, Snapshot, SnapshotSummary, TableMetadata, FORMAT_VERSION, OPERATION_OVERWRITE,
};
use crate::config::{JobConfig, DEFAULT_JOB_RUN_ID};
use crate::engine::JobSummary;
use crate::error::{Error, Result, ResultExt};
use crate::normalize::{NormalizedRecord, PARTITION_COLUMNS};
use crate::output::{
    arrow_to_json, build_partition_dir, decode_parquet, encode_parquet, records_to_batch,
    table_arrow_schema, ParquetWriterConfig, Warehouse,
};
use crate::schema::InferredSchema;
use crate::types::ScalarValue;
use bytes::Bytes;
use chrono::Utc;
use futures::future::join_all;
use object_store::{PutMode, PutOptions};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Orphaned metadata versions skipped before a commit gives up
const MAX_COMMIT_ATTEMPTS: usize = 16;

/// Outcome of a committed table replace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteResult {
    pub table: String,
    pub version: u64,
    pub snapshot_id: u64,
    pub rows_written: u64,
    /// Warehouse-relative paths of the new data files
    pub data_files: Vec<String>,
}

/// Handle to the warehouse and catalog for one job
#[derive(Debug)]
pub struct CatalogSession {
    warehouse: Warehouse,
    catalog: String,
    database: String,
    job_name: String,
    job_run_id: String,
    parquet: ParquetWriterConfig,
}

impl CatalogSession {
    /// Open the session for a job
    pub fn open(config: &JobConfig) -> Result<Self> {
        let warehouse = Warehouse::parse(&config.warehouse)?;
        info!(
            warehouse = %config.warehouse,
            catalog = %config.catalog,
            database = %config.database,
            "Opened catalog session"
        );
        Ok(Self::with_warehouse(warehouse, config))
    }

    /// Open the session over an existing warehouse
    pub fn with_warehouse(warehouse: Warehouse, config: &JobConfig) -> Self {
        Self {
            warehouse,
            catalog: config.catalog.clone(),
            database: config.database.clone(),
            job_name: config.job_name.clone(),
            job_run_id: config.run_id().to_string(),
            parquet: ParquetWriterConfig::default(),
        }
    }

    /// Read-only session for inspecting one table outside a job
    pub fn reader(warehouse: Warehouse, ident: &TableIdentifier) -> Self {
        Self {
            warehouse,
            catalog: ident.catalog().to_string(),
            database: ident.database().to_string(),
            job_name: "reader".to_string(),
            job_run_id: DEFAULT_JOB_RUN_ID.to_string(),
            parquet: ParquetWriterConfig::default(),
        }
    }

    pub fn warehouse(&self) -> &Warehouse {
        &self.warehouse
    }

    pub fn catalog(&self) -> &str {
        &self.catalog
    }

    /// Identifier for a table in the job's database
    pub fn table_identifier(&self, table: &str) -> Result<TableIdentifier> {
        TableIdentifier::new(&self.catalog, &self.database, table)
    }

    /// Current metadata version, if the table exists
    async fn current_version(&self, ident: &TableIdentifier) -> Result<Option<u64>> {
        let hint = version_hint_file(&ident.location());
        match self.warehouse.read(&hint).await {
            Ok(data) => {
                let text = String::from_utf8_lossy(&data);
                let version = text.trim().parse::<u64>().map_err(|e| {
                    Error::catalog(format!("Invalid version hint for {ident}: {e}"))
                })?;
                Ok(Some(version))
            }
            Err(Error::ObjectStore(object_store::Error::NotFound { .. })) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Load the current table metadata, if the table exists
    pub async fn load_metadata(&self, ident: &TableIdentifier) -> Result<Option<TableMetadata>> {
        let Some(version) = self.current_version(ident).await? else {
            return Ok(None);
        };

        let location = metadata_file(&ident.location(), version);
        let data = self
            .warehouse
            .read(&location)
            .await
            .with_context(|| format!("Failed to read metadata for {ident}"))?;
        let metadata: TableMetadata = serde_json::from_slice(&data)
            .with_context(|| format!("Invalid metadata at {location}"))?;
        Ok(Some(metadata))
    }

    /// Whether the table has a committed snapshot
    pub async fn table_exists(&self, ident: &TableIdentifier) -> Result<bool> {
        Ok(self.current_version(ident).await?.is_some())
    }

    /// Replace the full contents of a table, creating it if absent
    ///
    /// Records are partitioned by `(year, month, day)`.
    pub async fn replace_table(
        &self,
        ident: &TableIdentifier,
        schema: &InferredSchema,
        records: &[NormalizedRecord],
    ) -> Result<WriteResult> {
        let arrow_schema = table_arrow_schema(schema);
        let previous = self.load_metadata(ident).await?;
        let base = previous.as_ref().map(|m| m.version);
        let version = base.map_or(1, |v| v + 1);
        let now = Utc::now();
        // Unique per writer so a losing concurrent commit never touches the winner's files
        let snapshot_id = previous
            .as_ref()
            .map_or(0, |m| m.current_snapshot.snapshot_id + 1)
            .max(now.timestamp_micros() as u64);
        let table_location = ident.location();

        let mut partitions: BTreeMap<Vec<String>, Vec<&NormalizedRecord>> = BTreeMap::new();
        for record in records {
            partitions
                .entry(partition_values(record)?)
                .or_default()
                .push(record);
        }

        let mut data_files = Vec::with_capacity(partitions.len());
        for (values, rows) in &partitions {
            let partition: BTreeMap<String, String> = PARTITION_COLUMNS
                .iter()
                .map(ToString::to_string)
                .zip(values.iter().cloned())
                .collect();
            let dir = build_partition_dir(values.as_slice());
            let path = format!("{table_location}/data/{snapshot_id}/{dir}/part-00000.parquet");

            let batch = records_to_batch(rows, &arrow_schema)?;
            let bytes = encode_parquet(&batch, &self.parquet)?;
            let file_size_bytes = bytes.len() as u64;
            let url = self.warehouse.write(&path, bytes).await?;
            debug!(file = %url, rows = rows.len(), "Wrote data file");

            data_files.push(DataFile {
                path,
                partition,
                record_count: rows.len() as u64,
                file_size_bytes,
            });
        }

        let rows_written = records.len() as u64;
        let now_ms = now.timestamp_millis();
        let mut metadata = TableMetadata {
            format_version: FORMAT_VERSION,
            identifier: ident.to_string(),
            location: table_location.clone(),
            version,
            last_updated_ms: now_ms,
            schema: columns_from_arrow(&arrow_schema),
            partition_spec: partition_spec(),
            properties: table_properties(self.parquet.codec_name()),
            current_snapshot: Snapshot {
                snapshot_id,
                timestamp_ms: now_ms,
                operation: OPERATION_OVERWRITE.to_string(),
                job_run_id: Some(self.job_run_id.clone()),
                summary: SnapshotSummary {
                    added_records: rows_written,
                    added_data_files: data_files.len() as u64,
                },
                data_files,
            },
        };

        if let Err(e) = self.commit(ident, &mut metadata, base).await {
            self.remove_files(&metadata.current_snapshot.data_files).await;
            return Err(e);
        }

        let version = metadata.version;
        info!(
            table = %ident,
            version,
            rows = rows_written,
            "Committed table snapshot"
        );

        if let Some(previous) = previous {
            self.remove_files(&previous.current_snapshot.data_files).await;
        }

        Ok(WriteResult {
            table: ident.to_string(),
            version,
            snapshot_id,
            rows_written,
            data_files: metadata
                .current_snapshot
                .data_files
                .iter()
                .map(|f| f.path.clone())
                .collect(),
        })
    }

    /// Create the next free metadata version, then point the hint at it
    ///
    /// `base` is the version the new metadata was built on. A version file
    /// the hint never reached is left by an interrupted commit and is
    /// skipped; if the hint moved past `base`, another writer won.
    pub(crate) async fn commit(
        &self,
        ident: &TableIdentifier,
        metadata: &mut TableMetadata,
        base: Option<u64>,
    ) -> Result<()> {
        for _ in 0..MAX_COMMIT_ATTEMPTS {
            let location = metadata_file(&metadata.location, metadata.version);
            if self.create_metadata(&location, metadata).await? {
                return self.move_hint(metadata, &location).await;
            }

            if self.current_version(ident).await? != base {
                return Err(Error::CommitConflict {
                    table: ident.to_string(),
                    version: metadata.version,
                });
            }
            warn!(
                table = %ident,
                version = metadata.version,
                "Skipping orphaned metadata version"
            );
            metadata.version += 1;
        }

        Err(Error::catalog(format!(
            "No free metadata version for {ident} after {MAX_COMMIT_ATTEMPTS} attempts"
        )))
    }

    /// Create-only put of a metadata file; `false` if it already exists
    async fn create_metadata(&self, location: &str, metadata: &TableMetadata) -> Result<bool> {
        let path = self.warehouse.path(location);
        let payload = Bytes::from(serde_json::to_vec_pretty(metadata)?);

        let opts = PutOptions {
            mode: PutMode::Create,
            ..Default::default()
        };
        match self
            .warehouse
            .store()
            .put_opts(&path, payload.clone().into(), opts)
            .await
        {
            Ok(_) => Ok(true),
            Err(object_store::Error::AlreadyExists { .. }) => Ok(false),
            Err(object_store::Error::NotImplemented) => {
                self.warehouse.store().put(&path, payload.into()).await?;
                Ok(true)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Point the version hint at a freshly created metadata file
    async fn move_hint(&self, metadata: &TableMetadata, location: &str) -> Result<()> {
        let hint = version_hint_file(&metadata.location);
        if let Err(e) = self
            .warehouse
            .write(&hint, Bytes::from(metadata.version.to_string()))
            .await
        {
            let path = self.warehouse.path(location);
            if let Err(cleanup) = self.warehouse.store().delete(&path).await {
                warn!(file = %location, error = %cleanup, "Failed to remove uncommitted metadata");
            }
            return Err(e);
        }
        Ok(())
    }

    /// Delete data files, warning on failure
    async fn remove_files(&self, files: &[DataFile]) {
        let deletes = files.iter().map(|file| async move {
            let path = self.warehouse.path(&file.path);
            match self.warehouse.store().delete(&path).await {
                Ok(()) => debug!(file = %file.path, "Removed data file"),
                Err(e) => warn!(file = %file.path, error = %e, "Failed to remove data file"),
            }
        });
        join_all(deletes).await;
    }

    /// Read every row of the current snapshot
    pub async fn scan(&self, ident: &TableIdentifier) -> Result<Vec<Value>> {
        self.read_rows(ident, None).await
    }

    /// Read up to `limit` rows of the current snapshot
    pub async fn read_sample(&self, ident: &TableIdentifier, limit: usize) -> Result<Vec<Value>> {
        self.read_rows(ident, Some(limit)).await
    }

    async fn read_rows(&self, ident: &TableIdentifier, limit: Option<usize>) -> Result<Vec<Value>> {
        let metadata = self
            .load_metadata(ident)
            .await?
            .ok_or_else(|| Error::TableNotFound {
                table: ident.to_string(),
            })?;

        let mut rows = Vec::new();
        for file in &metadata.current_snapshot.data_files {
            let data = self.warehouse.read(&file.path).await?;
            for batch in decode_parquet(data)? {
                rows.extend(arrow_to_json(&batch)?);
                if let Some(limit) = limit {
                    if rows.len() >= limit {
                        rows.truncate(limit);
                        return Ok(rows);
                    }
                }
            }
        }
        Ok(rows)
    }

    /// Job-completion hook: persist the summary and release the session
    ///
    /// Returns the URL of the written summary.
    pub async fn close(self, summary: &JobSummary) -> Result<String> {
        let location = format!("_jobs/{}/{}.json", self.job_name, self.job_run_id);
        let payload = Bytes::from(serde_json::to_vec_pretty(summary)?);
        let url = self
            .warehouse
            .write(&location, payload)
            .await
            .context("Failed to write job summary")?;
        info!(summary = %url, outcome = %summary.outcome, "Closed catalog session");
        Ok(url)
    }
}

/// Partition column values of a normalized record
fn partition_values(record: &NormalizedRecord) -> Result<Vec<String>> {
    PARTITION_COLUMNS
        .iter()
        .map(|name| match record.get(name) {
            Some(ScalarValue::String(value)) => Ok(value.clone()),
            other => Err(Error::catalog(format!(
                "record has no usable partition value for '{name}': {other:?}"
            ))),
        })
        .collect()
}
