//! # I94 Warehouse
//!
//! A batch ETL that turns raw I94 immigration records, US city
//! demographics and global city temperatures into a star schema of
//! Parquet tables.
//!
//! ## Flow
//!
//! - **Source**: DataFusion reads the raw Parquet and delimited files
//! - **Clean**: empty rows and duplicates are removed
//! - **Build**: dimension and fact tables are projected and derived
//! - **Persist**: each table overwrites its directory in object storage
//! - **Verify**: every persisted table gets a row-count and duplicate check
//!
//! Every run is a full refresh. There is no incremental path.

pub mod clean;
pub mod config;
pub mod frame;
pub mod pipeline;
pub mod quality;
pub mod schema;
pub mod source;
pub mod storage;
pub mod telemetry;
pub mod warehouse;

mod error;

pub use error::{Error, Result};

use url::Url;

/// Configuration for one pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Raw input locations
    pub sources: SourceLocations,
    /// Warehouse destination
    pub storage: StorageConfig,
    /// Processing engine settings
    pub engine: EngineConfig,
}

/// Locations of the three raw datasets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocations {
    /// Directory of I94 Parquet files
    pub immigration: String,
    /// US city demographics, delimited text with header
    pub demographics: String,
    /// Global land temperatures by city, delimited text with header
    pub temperatures: String,
    /// Field separator of the delimited sources
    pub delimiter: u8,
}

impl Default for SourceLocations {
    fn default() -> Self {
        Self {
            immigration: "./sas_data".to_string(),
            demographics: "us-cities-demographics.csv".to_string(),
            temperatures: "GlobalLandTemperaturesByCity.csv".to_string(),
            delimiter: b';',
        }
    }
}

impl SourceLocations {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        [
            self.immigration.as_str(),
            self.demographics.as_str(),
            self.temperatures.as_str(),
        ]
        .into_iter()
    }
}

/// Warehouse destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Where the tables go
    pub provider: CloudProvider,
    /// Local directory, `memory://<prefix>` or `s3://bucket/prefix`
    pub location: String,
    /// AWS region used for S3 locations
    pub region: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: CloudProvider::Local,
            location: "./warehouse".to_string(),
            region: "us-east-1".to_string(),
        }
    }
}

impl StorageConfig {
    /// Infer the provider from the location's URL scheme. Anything that
    /// does not parse as a URL is a local path.
    pub fn from_location(location: &str) -> Result<Self> {
        let provider = match Url::parse(location) {
            Ok(url) => url
                .scheme()
                .parse::<CloudProvider>()
                .map_err(Error::Config)?,
            Err(_) => CloudProvider::Local,
        };

        Ok(Self {
            provider,
            location: location.to_string(),
            ..Self::default()
        })
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }
}

/// Supported warehouse storage backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudProvider {
    Local,
    Memory,
    Aws,
}

impl CloudProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Memory => "memory",
            Self::Aws => "aws",
        }
    }

    pub fn object_store_scheme(&self) -> &'static str {
        match self {
            Self::Local => "file",
            Self::Memory => "memory",
            Self::Aws => "s3",
        }
    }
}

impl std::str::FromStr for CloudProvider {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" | "file" => Ok(Self::Local),
            "memory" => Ok(Self::Memory),
            "aws" | "s3" | "s3a" => Ok(Self::Aws),
            other => Err(format!(
                "unknown storage provider '{}'; expected one of local, memory, aws",
                other
            )),
        }
    }
}

/// DataFusion session settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Rows per record batch produced by the reader
    pub batch_size: usize,
    /// Parallelism of scans
    pub target_partitions: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_size: 8192,
            target_partitions: num_cpus::get(),
        }
    }
}

/// Re-exports for convenience
pub mod prelude {
    pub use crate::clean::{clean, CleanOptions};
    pub use crate::frame::{ArrowFrame, Frame};
    pub use crate::pipeline::{Pipeline, PipelineReport, TableReport};
    pub use crate::quality::{check_quality, QualityReport};
    pub use crate::source::{Session, TableSource};
    pub use crate::storage::{ObjectStoreSink, TableSink};
    pub use crate::{
        CloudProvider, EngineConfig, Error, PipelineConfig, Result, SourceLocations,
        StorageConfig,
    };
}
