//! Raw dataset reading
//!
//! [`TableSource`] is the seam between the pipeline and whatever engine
//! produces its input frames. [`Session`] implements it with a DataFusion
//! `SessionContext`, which handles directory listing, Parquet decoding and
//! CSV schema inference for local paths and registered object stores.

use crate::frame::{ArrowFrame, Frame};
use crate::{EngineConfig, Error, Result};

use arrow_array::RecordBatch;
use async_trait::async_trait;
use datafusion::prelude::*;
use object_store::ObjectStore;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

/// Provider of raw datasets
#[async_trait]
pub trait TableSource: Send + Sync {
    /// Read a Parquet file or a directory of Parquet files
    async fn read_parquet(&self, location: &str) -> Result<ArrowFrame>;

    /// Read a delimited text file with a header row
    async fn read_delimited(&self, location: &str, delimiter: u8) -> Result<ArrowFrame>;
}

/// DataFusion-backed reader shared by every flow of a run
#[derive(Clone)]
pub struct Session {
    ctx: SessionContext,
}

impl Session {
    pub fn new(engine: &EngineConfig) -> Self {
        let mut session_config = SessionConfig::new()
            .with_batch_size(engine.batch_size)
            .with_target_partitions(engine.target_partitions.max(1))
            .with_parquet_pruning(true);
        // Plain Utf8 columns; the builders and the Parquet writer expect them
        session_config
            .options_mut()
            .execution
            .parquet
            .schema_force_view_types = false;

        Self {
            ctx: SessionContext::new_with_config(session_config),
        }
    }

    /// Make `store` reachable for locations under `url` (e.g. `s3://bucket`)
    pub fn register_object_store(&self, url: &Url, store: Arc<dyn ObjectStore>) {
        self.ctx.register_object_store(url, store);
    }

    async fn collect(&self, location: &str, df: DataFrame) -> Result<ArrowFrame> {
        let logical_schema = Arc::new(df.schema().as_arrow().clone());
        let batches: Vec<RecordBatch> = df
            .collect()
            .await
            .map_err(|e| source_error(location, e))?;

        let schema = batches
            .first()
            .map(|b| b.schema())
            .unwrap_or(logical_schema);
        let frame = ArrowFrame::try_from_batches(schema, &batches)?;

        info!(
            location,
            rows = frame.num_rows(),
            batches = batches.len(),
            "Source read"
        );
        Ok(frame)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

#[async_trait]
impl TableSource for Session {
    async fn read_parquet(&self, location: &str) -> Result<ArrowFrame> {
        debug!(location, "Reading Parquet source");
        let df = self
            .ctx
            .read_parquet(location, ParquetReadOptions::default())
            .await
            .map_err(|e| source_error(location, e))?;
        self.collect(location, df).await
    }

    async fn read_delimited(&self, location: &str, delimiter: u8) -> Result<ArrowFrame> {
        debug!(location, delimiter = %char::from(delimiter), "Reading delimited source");
        let extension = file_extension(location);
        let options = CsvReadOptions::new()
            .has_header(true)
            .delimiter(delimiter)
            .file_extension(&extension);

        let df = self
            .ctx
            .read_csv(location, options)
            .await
            .map_err(|e| source_error(location, e))?;
        self.collect(location, df).await
    }
}

fn source_error(location: &str, err: impl std::fmt::Display) -> Error {
    Error::SourceRead {
        location: location.to_string(),
        reason: err.to_string(),
    }
}

/// Extension filter for a single-file location. DataFusion only lists
/// files ending in the configured extension, so a `.txt` or extensionless
/// file must be matched by its own suffix.
fn file_extension(location: &str) -> String {
    let name = location.rsplit('/').next().unwrap_or(location);
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!(".{}", ext),
        _ => String::new(),
    }
}
