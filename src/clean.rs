//! Dataset cleaning
//!
//! Removes rows that carry no data in the key columns, removes duplicate
//! rows, and optionally prunes columns that are mostly empty. Dropped rows
//! are not reported individually; callers only see the smaller frame.

use crate::frame::{non_null_mask, Frame};
use crate::Result;

use arrow::compute::or;
use tracing::debug;

/// Default maximum null ratio a column may have before it is pruned
pub const DEFAULT_SPARSITY_THRESHOLD: f64 = 0.7;

/// Cleaning options
#[derive(Debug, Clone, PartialEq)]
pub struct CleanOptions {
    /// Columns considered for null filtering and deduplication.
    /// `None` means every column.
    pub key_columns: Option<Vec<String>>,
    /// Prune columns whose null ratio exceeds `sparsity_threshold`
    pub drop_sparse_columns: bool,
    /// Maximum tolerated null ratio, compared after rounding to 3 decimals
    pub sparsity_threshold: f64,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            key_columns: None,
            drop_sparse_columns: false,
            sparsity_threshold: DEFAULT_SPARSITY_THRESHOLD,
        }
    }
}

impl CleanOptions {
    /// Restrict null filtering and deduplication to the given columns
    pub fn with_key_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Enable sparse column pruning at the given threshold
    pub fn with_sparse_column_pruning(mut self, threshold: f64) -> Self {
        self.drop_sparse_columns = true;
        self.sparsity_threshold = threshold;
        self
    }
}

/// Clean a dataset.
///
/// 1. Drop rows that are null in every key column.
/// 2. Keep one row per distinct combination of key column values.
/// 3. If enabled, drop columns whose rounded null ratio is strictly above
///    the threshold.
pub fn clean<F: Frame>(dataset: &F, options: &CleanOptions) -> Result<F> {
    let key_columns: Option<Vec<&str>> = options
        .key_columns
        .as_ref()
        .map(|cols| cols.iter().map(String::as_str).collect());
    let subset = key_columns.as_deref();

    let input_rows = dataset.num_rows();
    let populated = drop_empty_rows(dataset, subset)?;
    let deduplicated = populated.drop_duplicates(subset)?;

    debug!(
        input_rows,
        populated_rows = populated.num_rows(),
        output_rows = deduplicated.num_rows(),
        "Cleaned dataset rows"
    );

    if !options.drop_sparse_columns {
        return Ok(deduplicated);
    }

    let sparse = sparse_columns(&deduplicated, options.sparsity_threshold)?;
    if sparse.is_empty() {
        return Ok(deduplicated);
    }

    debug!(columns = ?sparse, threshold = options.sparsity_threshold, "Dropping sparse columns");
    let names: Vec<&str> = sparse.iter().map(String::as_str).collect();
    deduplicated.drop_columns(&names)
}

/// Drop rows where every column in `subset` (or every column) is missing
fn drop_empty_rows<F: Frame>(dataset: &F, subset: Option<&[&str]>) -> Result<F> {
    let columns: Vec<String> = match subset {
        Some(names) if !names.is_empty() => names.iter().map(|s| s.to_string()).collect(),
        _ => dataset.column_names(),
    };

    let mut any_present = None;
    for name in &columns {
        let present = non_null_mask(dataset.column(name)?.as_ref())?;
        any_present = Some(match any_present {
            None => present,
            Some(acc) => or(&acc, &present)?,
        });
    }

    match any_present {
        Some(mask) if mask.true_count() < dataset.num_rows() => dataset.filter(&mask),
        _ => Ok(dataset.clone()),
    }
}

/// Columns whose null ratio, rounded to 3 decimals, exceeds `threshold`
pub fn sparse_columns<F: Frame>(dataset: &F, threshold: f64) -> Result<Vec<String>> {
    let total = dataset.num_rows();
    if total == 0 {
        return Ok(Vec::new());
    }

    Ok(dataset
        .null_counts()?
        .into_iter()
        .filter(|count| null_ratio(count.nulls, total) > threshold)
        .map(|count| count.column)
        .collect())
}

/// Null ratio rounded to 3 decimal places, halves to even
pub fn null_ratio(nulls: usize, total: usize) -> f64 {
    let ratio = nulls as f64 / total as f64;
    (ratio * 1000.0).round_ties_even() / 1000.0
}
