//! Pipeline orchestration
//!
//! Sequences the three source flows over one shared reader and one sink.
//! Each flow reads, cleans, builds, persists and then checks every table
//! it owns, awaiting each step before starting the next.

use crate::clean::{clean, CleanOptions};
use crate::frame::{ArrowFrame, Frame};
use crate::quality::{check_quality, QualityReport};
use crate::schema::{
    TableDefinition, DIM_CALENDAR, DIM_IMMIGRANT, DIM_TEMPERATURES, DIM_USA_DEMOGRAPHICS,
    FACT_IMMIGRATION,
};
use crate::source::TableSource;
use crate::storage::TableSink;
use crate::warehouse::{
    build_calendar, build_demographics, build_fact, build_immigrant, build_temperatures,
};
use crate::{Result, SourceLocations};

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Outcome of persisting and checking one table
#[derive(Debug, Clone, Serialize)]
pub struct TableReport {
    pub table: String,
    pub rows: usize,
    pub files: usize,
    pub bytes: u64,
    pub quality: QualityReport,
}

/// Summary of a pipeline run
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineReport {
    pub tables: Vec<TableReport>,
}

impl PipelineReport {
    pub fn table(&self, name: &str) -> Option<&TableReport> {
        self.tables.iter().find(|t| t.table == name)
    }

    /// True when every table passed its quality check
    pub fn all_passed(&self) -> bool {
        self.tables.iter().all(|t| t.quality.passed)
    }
}

/// Cleaning settings per source
#[derive(Debug, Clone, Default)]
pub struct CleanSettings {
    pub immigration: CleanOptions,
    pub demographics: CleanOptions,
    pub temperatures: CleanOptions,
}

/// Full-refresh warehouse build
pub struct Pipeline {
    source: Arc<dyn TableSource>,
    sink: Arc<dyn TableSink>,
    clean: CleanSettings,
}

impl Pipeline {
    pub fn new(source: Arc<dyn TableSource>, sink: Arc<dyn TableSink>) -> Self {
        Self {
            source,
            sink,
            clean: CleanSettings::default(),
        }
    }

    pub fn with_clean_settings(mut self, clean: CleanSettings) -> Self {
        self.clean = clean;
        self
    }

    /// Run the immigration, demographics and temperature flows in order.
    /// The first error aborts the run.
    pub async fn run(&self, locations: &SourceLocations) -> Result<PipelineReport> {
        let start = Instant::now();
        let mut report = PipelineReport::default();

        report
            .tables
            .extend(self.process_immigration(&locations.immigration).await?);
        report
            .tables
            .extend(self.process_demographics(&locations.demographics, locations.delimiter).await?);
        report
            .tables
            .extend(self.process_temperatures(&locations.temperatures, locations.delimiter).await?);

        info!(
            tables = report.tables.len(),
            all_passed = report.all_passed(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Pipeline run complete"
        );

        Ok(report)
    }

    /// Build `dim_calendar`, `dim_immigrant` and `fact_i94_immigration`
    /// from one cleaned immigration dataset
    pub async fn process_immigration(&self, location: &str) -> Result<Vec<TableReport>> {
        let raw = self.source.read_parquet(location).await?;
        let immigration = clean(&raw, &self.clean.immigration)?;
        info!(
            location,
            raw_rows = raw.num_rows(),
            cleaned_rows = immigration.num_rows(),
            "Immigration data cleaned"
        );

        let calendar = build_calendar(&immigration)?;
        let calendar = self.persist(&DIM_CALENDAR, &calendar).await?;

        let immigrant = build_immigrant(&immigration)?;
        let immigrant = self.persist(&DIM_IMMIGRANT, &immigrant).await?;

        let fact = build_fact(&immigration)?;
        let fact = self.persist(&FACT_IMMIGRATION, &fact).await?;

        Ok(vec![calendar, immigrant, fact])
    }

    /// Build `dim_usa_demographics`
    pub async fn process_demographics(
        &self,
        location: &str,
        delimiter: u8,
    ) -> Result<Vec<TableReport>> {
        let raw = self.source.read_delimited(location, delimiter).await?;
        let demographics = clean(&raw, &self.clean.demographics)?;
        info!(
            location,
            raw_rows = raw.num_rows(),
            cleaned_rows = demographics.num_rows(),
            "Demographics data cleaned"
        );

        let table = build_demographics(&demographics)?;
        Ok(vec![self.persist(&DIM_USA_DEMOGRAPHICS, &table).await?])
    }

    /// Build `dim_temperatures`
    pub async fn process_temperatures(
        &self,
        location: &str,
        delimiter: u8,
    ) -> Result<Vec<TableReport>> {
        let raw = self.source.read_delimited(location, delimiter).await?;
        let temperatures = clean(&raw, &self.clean.temperatures)?;
        info!(
            location,
            raw_rows = raw.num_rows(),
            cleaned_rows = temperatures.num_rows(),
            "Temperature data cleaned"
        );

        let table = build_temperatures(&temperatures)?;
        Ok(vec![self.persist(&DIM_TEMPERATURES, &table).await?])
    }

    /// Overwrite the table in the sink, then check the written rows
    async fn persist(
        &self,
        definition: &TableDefinition,
        table: &ArrowFrame,
    ) -> Result<TableReport> {
        let summary = self
            .sink
            .overwrite(
                definition.name,
                table.schema(),
                &table.batches(),
                definition.partition_by,
            )
            .await?;

        let quality = check_quality(table)?;
        if quality.passed {
            info!(table = definition.name, message = %quality.message, "Quality check");
        } else {
            warn!(table = definition.name, message = %quality.message, "Quality check");
        }

        Ok(TableReport {
            table: summary.table,
            rows: summary.rows,
            files: summary.files.len(),
            bytes: summary.bytes,
            quality,
        })
    }
}
