//! I94 Warehouse ETL Binary
//!
//! One-shot full refresh of the star schema. Prints a JSON run report.

use i94_warehouse::config::{ComponentFactory, Credentials};
use i94_warehouse::pipeline::Pipeline;
use i94_warehouse::telemetry::Telemetry;
use i94_warehouse::{EngineConfig, Error, SourceLocations, StorageConfig};

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// I94 Warehouse ETL
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory of raw I94 Parquet files
    #[arg(long, env = "I94_DATA", default_value = "./sas_data")]
    immigration: String,

    /// US city demographics file
    #[arg(long, env = "DEMOGRAPHICS_FILE", default_value = "us-cities-demographics.csv")]
    demographics: String,

    /// Global land temperatures by city file
    #[arg(long, env = "TEMPERATURES_FILE", default_value = "GlobalLandTemperaturesByCity.csv")]
    temperatures: String,

    /// Field separator of the delimited sources
    #[arg(long, default_value_t = ';')]
    delimiter: char,

    /// Warehouse destination: a directory, memory://prefix or s3://bucket/prefix
    #[arg(long, env = "WAREHOUSE_LOCATION", default_value = "./warehouse")]
    output: String,

    /// AWS region for S3 locations
    #[arg(long, env = "AWS_REGION", default_value = "us-east-1")]
    region: String,

    /// INI file with an [AWS] section
    #[arg(long, default_value = "credentials.cfg")]
    credentials: PathBuf,

    /// Rows per record batch when reading sources
    #[arg(long, default_value = "8192")]
    batch_size: usize,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let _telemetry = Telemetry::init_for_component("i94-warehouse-etl", &args.log_level)?;

    info!("Starting I94 warehouse ETL");

    if !args.delimiter.is_ascii() {
        return Err(Error::Config(format!(
            "delimiter must be a single ASCII character, got '{}'",
            args.delimiter
        ))
        .into());
    }

    let credentials = if args.credentials.exists() {
        Some(Credentials::from_file(&args.credentials)?)
    } else {
        warn!(
            path = %args.credentials.display(),
            "Credentials file not found; S3 locations will be unavailable"
        );
        None
    };

    let sources = SourceLocations {
        immigration: args.immigration,
        demographics: args.demographics,
        temperatures: args.temperatures,
        delimiter: args.delimiter as u8,
    };
    let storage = StorageConfig::from_location(&args.output)?.with_region(args.region);
    let engine = EngineConfig {
        batch_size: args.batch_size,
        ..EngineConfig::default()
    };

    let session = ComponentFactory::create_session(
        &engine,
        &sources,
        &storage.region,
        credentials.as_ref(),
    )?;
    let sink = ComponentFactory::create_sink(&storage, credentials.as_ref())?;

    info!(
        immigration = %sources.immigration,
        demographics = %sources.demographics,
        temperatures = %sources.temperatures,
        output = %storage.location,
        provider = storage.provider.as_str(),
        "Pipeline configured"
    );

    let pipeline = Pipeline::new(Arc::new(session), sink);
    let report = pipeline.run(&sources).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
