//! US city demographics dimension

use crate::frame::Frame;
use crate::schema::{ColumnMapping, DIM_USA_DEMOGRAPHICS, SURROGATE_ID_FIELD};
use crate::Result;

use arrow_array::Int64Array;
use std::sync::Arc;

/// Build `dim_usa_demographics` from the cleaned demographics dataset.
///
/// Columns are renamed to snake case and an `id` surrogate is assigned to
/// the cleaned rows, so ids always line up with what gets persisted. Each
/// race category of a city stays a separate row.
pub fn build_demographics<F: Frame>(demographics: &F) -> Result<F> {
    let projected = demographics.project(DIM_USA_DEMOGRAPHICS.columns)?;
    let ids = Int64Array::from_iter_values(0..projected.num_rows() as i64);

    let order: Vec<ColumnMapping> = std::iter::once(ColumnMapping::keep(SURROGATE_ID_FIELD))
        .chain(
            DIM_USA_DEMOGRAPHICS
                .columns
                .iter()
                .map(|c| ColumnMapping::keep(c.target)),
        )
        .collect();

    projected
        .with_column(SURROGATE_ID_FIELD, Arc::new(ids))?
        .project(&order)
}
