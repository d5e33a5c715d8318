//! Cleaning and table build throughput benchmark

use i94_warehouse::clean::{clean, CleanOptions};
use i94_warehouse::frame::ArrowFrame;
use i94_warehouse::storage::ParquetWriter;
use i94_warehouse::warehouse::{build_calendar, build_fact};

use arrow_array::{Float64Array, RecordBatch, StringArray};
use arrow_schema::{DataType, Field, Schema};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::sync::Arc;

fn create_immigration_batch(rows: usize) -> RecordBatch {
    let float_columns = [
        "cicid", "i94cit", "i94res", "arrdate", "i94mode", "depdate", "i94bir", "i94visa",
        "count", "biryear",
    ];
    let text_columns = [
        "i94addr", "visapost", "entdepa", "entdepd", "dtaddto", "gender", "airline", "fltno",
        "visatype",
    ];

    let mut fields = Vec::new();
    let mut columns: Vec<arrow_array::ArrayRef> = Vec::new();

    for name in float_columns {
        fields.push(Field::new(name, DataType::Float64, true));
        let values: Float64Array = (0..rows)
            .map(|i| match name {
                // Every tenth row repeats its predecessor
                "cicid" => Some((i - (i % 10 == 9) as usize) as f64),
                // One month of arrivals in April 2016
                "arrdate" => Some(20545.0 + (i % 30) as f64),
                "depdate" if i % 7 == 0 => None,
                _ => Some((i % 100) as f64),
            })
            .collect();
        columns.push(Arc::new(values));
    }

    for name in text_columns {
        fields.push(Field::new(name, DataType::Utf8, true));
        let values: Vec<Option<&str>> = (0..rows)
            .map(|i| match (name, i % 4) {
                ("gender", 0) => Some("F"),
                ("gender", 1) => Some("M"),
                ("airline", 3) => None,
                _ => Some("XX"),
            })
            .collect();
        columns.push(Arc::new(StringArray::from(values)));
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), columns).unwrap()
}

fn benchmark_clean(c: &mut Criterion) {
    let mut group = c.benchmark_group("clean");

    for rows in [1_000, 10_000, 100_000] {
        group.throughput(Throughput::Elements(rows as u64));

        let frame = ArrowFrame::try_new(create_immigration_batch(rows)).unwrap();
        let options = CleanOptions::default();

        group.bench_function(format!("{}_rows", rows), |b| {
            b.iter(|| {
                let _ = black_box(clean(&frame, &options).unwrap());
            });
        });
    }

    group.finish();
}

fn benchmark_build_tables(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_tables");

    let rows = 100_000;
    group.throughput(Throughput::Elements(rows as u64));
    let frame = ArrowFrame::try_new(create_immigration_batch(rows)).unwrap();
    let cleaned = clean(&frame, &CleanOptions::default()).unwrap();

    group.bench_function("calendar", |b| {
        b.iter(|| {
            let _ = black_box(build_calendar(&cleaned).unwrap());
        });
    });

    group.bench_function("fact", |b| {
        b.iter(|| {
            let _ = black_box(build_fact(&cleaned).unwrap());
        });
    });

    let fact = build_fact(&cleaned).unwrap();
    let writer = ParquetWriter::new();
    group.bench_function("fact_parquet_write", |b| {
        b.iter(|| {
            let batch = fact.batch().clone();
            let _ = black_box(writer.write_batches(batch.schema(), &[batch]).unwrap());
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_clean, benchmark_build_tables);
criterion_main!(benches);
