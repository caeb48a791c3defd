//! Warehouse storage (S3, R2, GCS, Azure, local)

use crate::error::{Error, Result};
use crate::normalize::PARTITION_COLUMNS;
use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use std::sync::Arc;

/// Build a Hive-style partition directory from partition values
///
/// Values pair up with the partition columns in order, giving
/// `year={YYYY}/month={MM}/day={DD}`.
pub fn build_partition_dir<S: AsRef<str>>(values: &[S]) -> String {
    PARTITION_COLUMNS
        .iter()
        .zip(values)
        .map(|(name, value)| format!("{name}={}", value.as_ref()))
        .collect::<Vec<_>>()
        .join("/")
}

/// Split `bucket/prefix` into its two parts
fn split_bucket(without_scheme: &str) -> (&str, String) {
    match without_scheme.split_once('/') {
        Some((bucket, prefix)) => (bucket, prefix.trim_matches('/').to_string()),
        None => (without_scheme, String::new()),
    }
}

/// Build a store rooted at one bucket or container
fn bucket_store(scheme: &str, bucket: &str) -> Result<Arc<dyn ObjectStore>> {
    let build_err = |e: object_store::Error| {
        Error::config(format!("Failed to create {scheme} client: {e}"))
    };

    let store: Arc<dyn ObjectStore> = match scheme {
        "s3" | "r2" => {
            // AWS_ENDPOINT is read by from_env(); R2 may also name its own
            let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);
            if scheme == "r2" {
                if let Ok(endpoint) = std::env::var("R2_ENDPOINT_URL") {
                    builder = builder.with_endpoint(endpoint);
                }
            }
            Arc::new(builder.build().map_err(build_err)?)
        }
        "gs" => Arc::new(
            GoogleCloudStorageBuilder::from_env()
                .with_bucket_name(bucket)
                .build()
                .map_err(build_err)?,
        ),
        "az" => Arc::new(
            MicrosoftAzureBuilder::from_env()
                .with_container_name(bucket)
                .build()
                .map_err(build_err)?,
        ),
        other => {
            return Err(Error::invalid_value(
                "warehouse",
                format!("unsupported scheme '{other}'"),
            ))
        }
    };
    Ok(store)
}

/// Object storage root that holds every table of the job
#[derive(Debug, Clone)]
pub struct Warehouse {
    store: Arc<dyn ObjectStore>,
    /// Path prefix within the bucket or container
    prefix: String,
    /// URL scheme, used in logs and returned locations
    scheme: String,
}

impl Warehouse {
    /// Parse a warehouse URL and create the matching object store
    ///
    /// Supported formats:
    /// - `s3://bucket/path/` - AWS S3
    /// - `r2://bucket/path/` - Cloudflare R2 (S3-compatible)
    /// - `gs://bucket/path/` - Google Cloud Storage
    /// - `az://container/path/` - Azure Blob Storage
    /// - `memory://` - in-process store, lost on exit
    /// - `/local/path/`, `./path/` or `file:///path` - Local filesystem
    pub fn parse(url: &str) -> Result<Self> {
        match url.split_once("://") {
            Some(("memory", _)) => Ok(Self::in_memory()),
            Some(("file", path)) => Self::local(path),
            Some((scheme, rest)) => {
                let (bucket, prefix) = split_bucket(rest);
                if bucket.is_empty() {
                    return Err(Error::invalid_value(
                        "warehouse",
                        format!("missing bucket in {url}"),
                    ));
                }
                Ok(Self {
                    store: bucket_store(scheme, bucket)?,
                    prefix,
                    scheme: scheme.to_string(),
                })
            }
            None => Self::local(url),
        }
    }

    /// Wrap an existing object store
    pub fn from_store(store: Arc<dyn ObjectStore>, scheme: impl Into<String>) -> Self {
        Self {
            store,
            prefix: String::new(),
            scheme: scheme.into(),
        }
    }

    /// Fresh in-memory warehouse
    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(InMemory::new()), "memory")
    }

    /// Local directory, created if missing
    fn local(path: &str) -> Result<Self> {
        std::fs::create_dir_all(path)
            .map_err(|e| Error::config(format!("Failed to create directory {path}: {e}")))?;

        let store = LocalFileSystem::new_with_prefix(path)
            .map_err(|e| Error::config(format!("Failed to create local store: {e}")))?;

        Ok(Self::from_store(Arc::new(store), "file"))
    }

    /// Get the scheme (s3, r2, gs, az, memory, file)
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Underlying object store
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// Resolve a warehouse-relative location to an object path
    pub fn path(&self, location: &str) -> ObjectPath {
        let location = location.trim_start_matches('/');
        if self.prefix.is_empty() {
            ObjectPath::from(location)
        } else {
            ObjectPath::from(format!("{}/{location}", self.prefix))
        }
    }

    /// Full URL of a location, for logging
    pub fn url(&self, location: &str) -> String {
        format!("{}://{}", self.scheme, self.path(location))
    }

    /// Write bytes to a warehouse-relative location
    pub async fn write(&self, location: &str, data: Bytes) -> Result<String> {
        let path = self.path(location);
        self.store.put(&path, data.into()).await?;
        Ok(format!("{}://{path}", self.scheme))
    }

    /// Read a warehouse-relative location
    pub async fn read(&self, location: &str) -> Result<Bytes> {
        let path = self.path(location);
        let data = self.store.get(&path).await?.bytes().await?;
        Ok(data)
    }
}
