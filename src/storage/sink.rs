//! Table sink writing Parquet tables to object storage

use super::ParquetWriter;
use crate::{Error, Result};

use arrow::compute::{concat_batches, take};
use arrow::util::display::array_value_to_string;
use arrow_array::{Array, ArrayRef, RecordBatch, UInt32Array};
use arrow_schema::{Schema, SchemaRef};
use async_trait::async_trait;
use futures::TryStreamExt;
use object_store::path::Path;
use object_store::ObjectStore;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Directory name used for a null partition value
pub const NULL_PARTITION_VALUE: &str = "__HIVE_DEFAULT_PARTITION__";

const PART_FILE_NAME: &str = "part-00000.parquet";

/// Result of persisting one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteSummary {
    pub table: String,
    pub rows: usize,
    pub files: Vec<String>,
    pub bytes: u64,
}

/// Destination for finished warehouse tables
#[async_trait]
pub trait TableSink: Send + Sync {
    /// Replace everything stored for `table` with `batches`.
    ///
    /// Columns named in `partition_by` are written as nested `col=value`
    /// directories and removed from the file data.
    async fn overwrite(
        &self,
        table: &str,
        schema: SchemaRef,
        batches: &[RecordBatch],
        partition_by: &[&str],
    ) -> Result<WriteSummary>;
}

/// Writes each table as Parquet under `root/<table>/` in an object store
pub struct ObjectStoreSink {
    object_store: Arc<dyn ObjectStore>,
    root: Path,
    writer: ParquetWriter,
    /// Filesystem directory backing `object_store`, when it is local
    local_dir: Option<PathBuf>,
}

impl ObjectStoreSink {
    pub fn new(object_store: Arc<dyn ObjectStore>, root: Path) -> Self {
        Self {
            object_store,
            root,
            writer: ParquetWriter::new(),
            local_dir: None,
        }
    }

    /// Mark the store as a `LocalFileSystem` rooted at `dir`, so clearing a
    /// table also removes its leftover partition directories
    pub fn with_local_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.local_dir = Some(dir.into());
        self
    }

    /// Location of a table's directory
    pub fn table_path(&self, table: &str) -> Path {
        self.root.child(table)
    }

    /// Delete every object under `prefix`
    async fn clear(&self, prefix: &Path) -> Result<usize> {
        let existing: Vec<_> = self
            .object_store
            .list(Some(prefix))
            .try_collect()
            .await?;

        for meta in &existing {
            self.object_store.delete(&meta.location).await?;
        }

        if let Some(dir) = &self.local_dir {
            let table_dir = prefix
                .parts()
                .fold(dir.clone(), |acc, part| {
                    let part: &str = part.as_ref();
                    acc.join(part)
                });
            match tokio::fs::remove_dir_all(&table_dir).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        Ok(existing.len())
    }
}

#[async_trait]
impl TableSink for ObjectStoreSink {
    async fn overwrite(
        &self,
        table: &str,
        schema: SchemaRef,
        batches: &[RecordBatch],
        partition_by: &[&str],
    ) -> Result<WriteSummary> {
        let table_path = self.table_path(table);
        let removed = self.clear(&table_path).await?;
        if removed > 0 {
            debug!(table, removed, "Removed previous table contents");
        }

        let combined = concat_batches(&schema, batches)?;
        let partitions = if partition_by.is_empty() {
            vec![(Vec::new(), combined)]
        } else {
            partition_batch(&combined, partition_by)?
        };

        let mut summary = WriteSummary {
            table: table.to_string(),
            rows: 0,
            files: Vec::with_capacity(partitions.len()),
            bytes: 0,
        };

        for (values, batch) in partitions {
            let mut path = table_path.clone();
            for (column, value) in &values {
                path = path.child(format!("{}={}", column, value));
            }
            let path = path.child(PART_FILE_NAME);

            let bytes = self.writer.write_batches(batch.schema(), &[batch.clone()])?;
            summary.rows += batch.num_rows();
            summary.bytes += bytes.len() as u64;

            debug!(
                path = %path,
                rows = batch.num_rows(),
                size_bytes = bytes.len(),
                "Writing Parquet file"
            );
            self.object_store.put(&path, bytes.into()).await?;
            summary.files.push(path.to_string());
        }

        info!(
            table,
            rows = summary.rows,
            files = summary.files.len(),
            size_bytes = summary.bytes,
            "Table written"
        );

        Ok(summary)
    }
}

/// Partition column values of one group, in `partition_by` order
pub type PartitionValues = Vec<(String, String)>;

/// Split a batch into one batch per distinct combination of partition
/// values, ordered by those values. The returned batches no longer contain
/// the partition columns.
pub fn partition_batch(
    batch: &RecordBatch,
    partition_by: &[&str],
) -> Result<Vec<(PartitionValues, RecordBatch)>> {
    let schema = batch.schema();
    let key_indices: Vec<usize> = partition_by
        .iter()
        .map(|name| {
            schema
                .index_of(name)
                .map_err(|_| Error::MissingColumn(name.to_string()))
        })
        .collect::<Result<_>>()?;

    let mut groups: BTreeMap<Vec<String>, Vec<u32>> = BTreeMap::new();
    for row in 0..batch.num_rows() {
        let key = key_indices
            .iter()
            .map(|i| partition_value(batch.column(*i).as_ref(), row))
            .collect::<Result<Vec<_>>>()?;
        groups.entry(key).or_default().push(row as u32);
    }

    let data_indices: Vec<usize> = (0..schema.fields().len())
        .filter(|i| !key_indices.contains(i))
        .collect();
    let data_schema = Arc::new(Schema::new(
        data_indices
            .iter()
            .map(|i| schema.field(*i).clone())
            .collect::<Vec<_>>(),
    ));

    groups
        .into_iter()
        .map(|(key, rows)| -> Result<(PartitionValues, RecordBatch)> {
            let indices = UInt32Array::from(rows);
            let columns: Vec<ArrayRef> = data_indices
                .iter()
                .map(|i| take(batch.column(*i).as_ref(), &indices, None))
                .collect::<std::result::Result<_, _>>()?;
            let values = partition_by
                .iter()
                .map(|name| name.to_string())
                .zip(key)
                .collect();
            Ok((values, RecordBatch::try_new(data_schema.clone(), columns)?))
        })
        .collect()
}

fn partition_value(column: &dyn Array, row: usize) -> Result<String> {
    if column.is_null(row) {
        return Ok(NULL_PARTITION_VALUE.to_string());
    }
    Ok(array_value_to_string(column, row)?)
}
