//! Parquet codec for table data files
//!
//! Data files are built in memory and handed to the warehouse as a single
//! object, so there is no streaming writer here.

use crate::error::{Error, Result};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::{EnabledStatistics, WriterProperties};
use parquet::file::reader::{FileReader, SerializedFileReader};

/// Settings applied to every data file a session writes
#[derive(Debug, Clone)]
pub struct ParquetWriterConfig {
    compression: Compression,
    row_group_size: usize,
    statistics_enabled: bool,
}

impl Default for ParquetWriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: 1024 * 1024, // 1M rows
            statistics_enabled: true,
        }
    }
}

impl ParquetWriterConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    #[must_use]
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Enable or disable column statistics
    #[must_use]
    pub fn with_statistics(mut self, enabled: bool) -> Self {
        self.statistics_enabled = enabled;
        self
    }

    #[must_use]
    pub fn compression(&self) -> Compression {
        self.compression
    }

    #[must_use]
    pub fn row_group_size(&self) -> usize {
        self.row_group_size
    }

    #[must_use]
    pub fn is_statistics_enabled(&self) -> bool {
        self.statistics_enabled
    }

    /// Codec name as recorded in table properties
    #[must_use]
    pub fn codec_name(&self) -> &'static str {
        codec_name(self.compression)
    }

    fn writer_properties(&self) -> WriterProperties {
        let statistics = if self.statistics_enabled {
            EnabledStatistics::Page
        } else {
            EnabledStatistics::None
        };
        WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .set_statistics_enabled(statistics)
            .build()
    }
}

fn codec_name(compression: Compression) -> &'static str {
    match compression {
        Compression::UNCOMPRESSED => "uncompressed",
        Compression::SNAPPY => "snappy",
        Compression::GZIP(_) => "gzip",
        Compression::ZSTD(_) => "zstd",
        Compression::LZ4 | Compression::LZ4_RAW => "lz4",
        Compression::BROTLI(_) => "brotli",
        Compression::LZO => "lzo",
    }
}

/// Encode a RecordBatch as a complete Parquet file
pub fn encode_parquet(batch: &RecordBatch, config: &ParquetWriterConfig) -> Result<Bytes> {
    let output_err = |stage: &str, e: parquet::errors::ParquetError| {
        Error::output(format!("Failed to {stage} Parquet data file: {e}"))
    };

    let mut writer = ArrowWriter::try_new(
        Vec::new(),
        batch.schema(),
        Some(config.writer_properties()),
    )
    .map_err(|e| output_err("create", e))?;
    writer.write(batch).map_err(|e| output_err("write", e))?;
    let buffer = writer.into_inner().map_err(|e| output_err("close", e))?;

    Ok(Bytes::from(buffer))
}

/// Decode a Parquet file into RecordBatches
pub fn decode_parquet(data: Bytes) -> Result<Vec<RecordBatch>> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(data)?.build()?;
    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(batches)
}

/// Codec used by the first column chunk of a Parquet file, if it has any rows
pub fn parquet_codec(data: Bytes) -> Result<Option<&'static str>> {
    let reader = SerializedFileReader::new(data)?;
    let metadata = reader.metadata();
    if metadata.num_row_groups() == 0 || metadata.row_group(0).num_columns() == 0 {
        return Ok(None);
    }
    Ok(Some(codec_name(metadata.row_group(0).column(0).compression())))
}
