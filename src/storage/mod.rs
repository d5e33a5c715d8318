//! Persistence of warehouse tables
//!
//! Tables are written as Parquet through the [`TableSink`] seam. The
//! object-store implementation covers local directories, S3 and the
//! in-memory store used by tests.

mod parquet_writer;
mod sink;

pub use parquet_writer::ParquetWriter;
pub use sink::{
    partition_batch, ObjectStoreSink, PartitionValues, TableSink, WriteSummary,
    NULL_PARTITION_VALUE,
};
