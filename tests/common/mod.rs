//! Shared fixtures for the integration tests

#![allow(dead_code)]

use arrow_array::{ArrayRef, Float64Array, Int64Array, RecordBatch, StringArray};
use arrow_schema::{DataType, Field, Schema};
use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use i94_warehouse::frame::ArrowFrame;
use i94_warehouse::source::TableSource;
use i94_warehouse::{Error, Result};
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::ObjectStore;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::collections::HashMap;
use std::sync::Arc;

pub const IMMIGRATION: &str = "raw/sas_data";
pub const DEMOGRAPHICS: &str = "raw/us-cities-demographics.csv";
pub const TEMPERATURES: &str = "raw/GlobalLandTemperaturesByCity.csv";

const FLOAT_COLUMNS: &[&str] = &[
    "cicid", "i94cit", "i94res", "arrdate", "i94mode", "depdate", "i94bir", "i94visa", "count",
    "biryear",
];
const TEXT_COLUMNS: &[&str] = &[
    "i94addr", "visapost", "entdepa", "entdepd", "dtaddto", "gender", "airline", "fltno",
    "visatype",
];

/// One raw I94 record; `None` leaves every column empty
#[derive(Debug, Clone, Copy)]
pub struct I94Row {
    pub cicid: f64,
    pub arrdate: Option<f64>,
    pub gender: &'static str,
}

impl I94Row {
    pub fn new(cicid: f64, arrdate: Option<f64>) -> Self {
        Self {
            cicid,
            arrdate,
            gender: "F",
        }
    }
}

/// Raw immigration frame with the full I94 column set
pub fn immigration(rows: &[Option<I94Row>]) -> ArrowFrame {
    let mut fields = Vec::new();
    let mut columns: Vec<ArrayRef> = Vec::new();

    for name in FLOAT_COLUMNS {
        fields.push(Field::new(*name, DataType::Float64, true));
        let values: Float64Array = rows
            .iter()
            .map(|row| {
                row.and_then(|r| match *name {
                    "cicid" => Some(r.cicid),
                    "arrdate" => r.arrdate,
                    "count" => Some(1.0),
                    _ => Some(r.cicid * 10.0),
                })
            })
            .collect();
        columns.push(Arc::new(values));
    }

    for name in TEXT_COLUMNS {
        fields.push(Field::new(*name, DataType::Utf8, true));
        let values: StringArray = rows
            .iter()
            .map(|row| {
                row.map(|r| match *name {
                    "gender" => r.gender.to_string(),
                    other => format!("{}-{}", other, r.cicid),
                })
            })
            .collect();
        columns.push(Arc::new(values));
    }

    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).unwrap();
    ArrowFrame::try_new(batch).unwrap()
}

/// Raw demographics frame with title-case headers, one row per (city, race)
pub fn demographics(rows: &[(&str, &str, &str, i64)]) -> ArrowFrame {
    let text = |values: Vec<&str>| -> ArrayRef { Arc::new(StringArray::from(values)) };
    let float = |v: f64| -> ArrayRef { Arc::new(Float64Array::from(vec![v; rows.len()])) };
    let int = |v: i64| -> ArrayRef { Arc::new(Int64Array::from(vec![v; rows.len()])) };

    let schema = Arc::new(Schema::new(vec![
        Field::new("City", DataType::Utf8, true),
        Field::new("State", DataType::Utf8, true),
        Field::new("Median Age", DataType::Float64, true),
        Field::new("Male Population", DataType::Int64, true),
        Field::new("Female Population", DataType::Int64, true),
        Field::new("Total Population", DataType::Int64, true),
        Field::new("Number of Veterans", DataType::Int64, true),
        Field::new("Foreign-born", DataType::Int64, true),
        Field::new("Average Household Size", DataType::Float64, true),
        Field::new("State Code", DataType::Utf8, true),
        Field::new("Race", DataType::Utf8, true),
        Field::new("Count", DataType::Int64, true),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            text(rows.iter().map(|r| r.0).collect()),
            text(rows.iter().map(|r| r.1).collect()),
            float(35.5),
            int(40_000),
            int(41_000),
            int(81_000),
            int(5_000),
            int(9_000),
            float(2.6),
            text(vec!["XX"; rows.len()]),
            text(rows.iter().map(|r| r.2).collect()),
            Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.3))),
        ],
    )
    .unwrap();
    ArrowFrame::try_new(batch).unwrap()
}

/// Raw temperature frame
pub fn temperatures(rows: &[(&str, Option<f64>, &str)]) -> ArrowFrame {
    let n = rows.len();
    let schema = Arc::new(Schema::new(vec![
        Field::new("dt", DataType::Utf8, true),
        Field::new("AverageTemperature", DataType::Float64, true),
        Field::new("AverageTemperatureUncertainty", DataType::Float64, true),
        Field::new("City", DataType::Utf8, true),
        Field::new("Country", DataType::Utf8, true),
        Field::new("Latitude", DataType::Utf8, true),
        Field::new("Longitude", DataType::Utf8, true),
    ]));
    let batch = RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.0))),
            Arc::new(Float64Array::from_iter(rows.iter().map(|r| r.1))),
            Arc::new(Float64Array::from(vec![0.3; n])),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.2))),
            Arc::new(StringArray::from(vec!["Denmark"; n])),
            Arc::new(StringArray::from(vec!["57.05N"; n])),
            Arc::new(StringArray::from(vec!["10.33E"; n])),
        ],
    )
    .unwrap();
    ArrowFrame::try_new(batch).unwrap()
}

/// In-process source serving prepared frames by location
#[derive(Default)]
pub struct FixtureSource {
    frames: HashMap<String, ArrowFrame>,
}

impl FixtureSource {
    pub fn with(mut self, location: &str, frame: ArrowFrame) -> Self {
        self.frames.insert(location.to_string(), frame);
        self
    }

    fn get(&self, location: &str) -> Result<ArrowFrame> {
        self.frames
            .get(location)
            .cloned()
            .ok_or_else(|| Error::SourceRead {
                location: location.to_string(),
                reason: "no such fixture".to_string(),
            })
    }
}

#[async_trait]
impl TableSource for FixtureSource {
    async fn read_parquet(&self, location: &str) -> Result<ArrowFrame> {
        self.get(location)
    }

    async fn read_delimited(&self, location: &str, _delimiter: u8) -> Result<ArrowFrame> {
        self.get(location)
    }
}

/// Every object path in the store, sorted
pub async fn list_paths(store: &InMemory) -> Vec<String> {
    let mut paths: Vec<String> = store
        .list(None)
        .map_ok(|meta| meta.location.to_string())
        .try_collect()
        .await
        .unwrap();
    paths.sort();
    paths
}

/// Decode one Parquet object into record batches
pub async fn read_parquet_object(store: &InMemory, path: &str) -> Vec<RecordBatch> {
    let data: Bytes = store
        .get(&Path::from(path))
        .await
        .unwrap()
        .bytes()
        .await
        .unwrap();
    ParquetRecordBatchReaderBuilder::try_new(data)
        .unwrap()
        .build()
        .unwrap()
        .map(|b| b.unwrap())
        .collect()
}
