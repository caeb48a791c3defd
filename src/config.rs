//! Job configuration
//!
//! A job is described once, up front, by an immutable [`JobConfig`]: where to
//! send queries, which datasets to pull, and where the resulting tables live.
//! It can be loaded from a YAML file or from the flat `KEY=VALUE` argument set
//! the scheduled job has always been launched with.

use crate::catalog::TableIdentifier;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Run identifier used when the scheduler does not supply one
pub const DEFAULT_JOB_RUN_ID: &str = "manual";

/// Catalog name prefixed to every table identifier by default
pub const DEFAULT_CATALOG: &str = "glue_catalog";

/// Fixed timeout for every source request
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// Dataset Spec
// ============================================================================

/// One query to run and the table its results replace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSpec {
    /// Dataset name (e.g. "shows"); also written to the `data_type` column
    pub name: String,

    /// Query string sent as the request body's `query` member
    pub query: String,

    /// Target table name inside the configured database
    pub table: String,
}

impl DatasetSpec {
    pub fn new(
        name: impl Into<String>,
        query: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            query: query.into(),
            table: table.into(),
        }
    }
}

// ============================================================================
// Job Config
// ============================================================================

/// Complete job configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Job name, used in logs and the job summary location
    pub job_name: String,

    /// Query API endpoint URL
    pub endpoint: String,

    /// Warehouse root: `s3://`, `r2://`, `gs://`, `az://` URL or local path
    pub warehouse: String,

    /// Catalog name (first identifier component)
    #[serde(default = "default_catalog")]
    pub catalog: String,

    /// Target database name
    pub database: String,

    /// Scheduler-assigned run identifier
    #[serde(default)]
    pub job_run_id: Option<String>,

    /// Datasets, processed in this order
    #[serde(default)]
    pub datasets: Vec<DatasetSpec>,
}

fn default_catalog() -> String {
    DEFAULT_CATALOG.to_string()
}

impl JobConfig {
    /// Load and validate a YAML config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a YAML config string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: JobConfig = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse job YAML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Build from the job's flat argument set
    ///
    /// Required keys: `JOB_NAME`, `GRAPHQL_ENDPOINT`, `GRAPHQL_QUERY_SHOWS`,
    /// `GRAPHQL_QUERY_EPISODES`, `S3_BUCKET`, `DATABASE_NAME`,
    /// `TABLE_NAME_SHOWS`, `TABLE_NAME_EPISODES`. `JOB_RUN_ID` is optional.
    pub fn from_job_args(args: &HashMap<String, String>) -> Result<Self> {
        let get = |key: &str| -> Result<String> {
            args.get(key)
                .cloned()
                .ok_or_else(|| Error::missing_field(key))
        };

        let bucket = get("S3_BUCKET")?;
        let config = Self {
            job_name: get("JOB_NAME")?,
            endpoint: get("GRAPHQL_ENDPOINT")?,
            warehouse: format!("s3://{}", bucket.trim_end_matches('/')),
            catalog: default_catalog(),
            database: get("DATABASE_NAME")?,
            job_run_id: args.get("JOB_RUN_ID").cloned(),
            datasets: vec![
                DatasetSpec::new(
                    "shows",
                    get("GRAPHQL_QUERY_SHOWS")?,
                    get("TABLE_NAME_SHOWS")?,
                ),
                DatasetSpec::new(
                    "episodes",
                    get("GRAPHQL_QUERY_EPISODES")?,
                    get("TABLE_NAME_EPISODES")?,
                ),
            ],
        };
        config.validate()?;
        Ok(config)
    }

    /// Override the run identifier
    #[must_use]
    pub fn with_job_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.job_run_id = Some(run_id.into());
        self
    }

    /// Override the warehouse root
    #[must_use]
    pub fn with_warehouse(mut self, warehouse: impl Into<String>) -> Self {
        self.warehouse = warehouse.into();
        self
    }

    /// Effective run identifier
    pub fn run_id(&self) -> &str {
        self.job_run_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .unwrap_or(DEFAULT_JOB_RUN_ID)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.job_name.trim().is_empty() {
            return Err(Error::invalid_value("job_name", "cannot be empty"));
        }

        let url = url::Url::parse(&self.endpoint)
            .map_err(|e| Error::invalid_value("endpoint", e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::invalid_value(
                "endpoint",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }

        if self.warehouse.trim().is_empty() {
            return Err(Error::invalid_value("warehouse", "cannot be empty"));
        }
        if self.catalog.trim().is_empty() {
            return Err(Error::invalid_value("catalog", "cannot be empty"));
        }
        if self.database.trim().is_empty() {
            return Err(Error::invalid_value("database", "cannot be empty"));
        }
        if self.datasets.is_empty() {
            return Err(Error::invalid_value(
                "datasets",
                "at least one dataset is required",
            ));
        }

        let mut seen = HashSet::new();
        for dataset in &self.datasets {
            if dataset.name.trim().is_empty() {
                return Err(Error::invalid_value("datasets.name", "cannot be empty"));
            }
            if !seen.insert(dataset.name.as_str()) {
                return Err(Error::invalid_value(
                    "datasets.name",
                    format!("duplicate dataset '{}'", dataset.name),
                ));
            }
            if dataset.query.trim().is_empty() {
                return Err(Error::invalid_value(
                    format!("datasets.{}.query", dataset.name),
                    "cannot be empty",
                ));
            }
            if dataset.table.trim().is_empty() {
                return Err(Error::invalid_value(
                    format!("datasets.{}.table", dataset.name),
                    "cannot be empty",
                ));
            }
            TableIdentifier::new(&self.catalog, &self.database, &dataset.table)?;
        }

        Ok(())
    }
}

/// Parse a `KEY=VALUE` argument
pub fn parse_key_value(arg: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{arg}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{arg}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
