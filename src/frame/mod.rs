//! Tabular dataset abstraction
//!
//! The cleaner, the table builders and the quality checker only talk to
//! datasets through [`Frame`]. Every operation returns a new value; no
//! frame is ever mutated in place. [`ArrowFrame`] is the in-process backend
//! built on Arrow compute kernels.

mod arrow_frame;

pub use arrow_frame::ArrowFrame;

use crate::schema::ColumnMapping;
use crate::Result;

use arrow::compute::is_not_null;
use arrow_array::cast::AsArray;
use arrow_array::types::{Float32Type, Float64Type};
use arrow_array::{Array, ArrayRef, BooleanArray, RecordBatch};
use arrow_schema::SchemaRef;

/// Number of missing values in one column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NullCount {
    pub column: String,
    pub nulls: usize,
}

/// Capabilities a dataset backend must provide
pub trait Frame: Sized + Clone {
    /// Schema of the dataset
    fn schema(&self) -> SchemaRef;

    /// Total row count
    fn num_rows(&self) -> usize;

    /// Column values by name
    fn column(&self, name: &str) -> Result<ArrayRef>;

    /// Keep rows where `mask` is true
    fn filter(&self, mask: &BooleanArray) -> Result<Self>;

    /// Keep the first row of every group of rows equal across `subset`
    /// (all columns when `None` or empty)
    fn drop_duplicates(&self, subset: Option<&[&str]>) -> Result<Self>;

    /// Missing-value count per column, in schema order
    fn null_counts(&self) -> Result<Vec<NullCount>>;

    /// Select columns in the given order, renaming source to target
    fn project(&self, columns: &[ColumnMapping]) -> Result<Self>;

    /// Replace the named column, or append it if absent
    fn with_column(&self, name: &str, values: ArrayRef) -> Result<Self>;

    /// Remove the named columns; unknown names are ignored
    fn drop_columns(&self, names: &[&str]) -> Result<Self>;

    /// Sort rows ascending by one column, nulls first
    fn sort_by(&self, column: &str) -> Result<Self>;

    /// Materialize the rows as record batches
    fn batches(&self) -> Vec<RecordBatch>;

    fn column_names(&self) -> Vec<String> {
        self.schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }
}

/// True where a value is present. NaN floats count as missing.
pub fn non_null_mask(array: &dyn Array) -> Result<BooleanArray> {
    if let Some(values) = array.as_primitive_opt::<Float64Type>() {
        return Ok(values
            .iter()
            .map(|v| Some(v.is_some_and(|x| !x.is_nan())))
            .collect());
    }
    if let Some(values) = array.as_primitive_opt::<Float32Type>() {
        return Ok(values
            .iter()
            .map(|v| Some(v.is_some_and(|x| !x.is_nan())))
            .collect());
    }
    Ok(is_not_null(array)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_array::{Float64Array, StringArray};

    #[test]
    fn test_non_null_mask_treats_nan_as_missing() {
        let values = Float64Array::from(vec![Some(1.0), None, Some(f64::NAN)]);
        let mask = non_null_mask(&values).unwrap();
        assert_eq!(mask, BooleanArray::from(vec![true, false, false]));
    }

    #[test]
    fn test_non_null_mask_strings() {
        let values = StringArray::from(vec![Some("a"), None, Some("")]);
        let mask = non_null_mask(&values).unwrap();
        assert_eq!(mask, BooleanArray::from(vec![true, false, true]));
    }
}
