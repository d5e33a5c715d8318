//! Post-load data quality checks
//!
//! A table passes when it has at least one row and no fully duplicated
//! rows. Reports are informational: the pipeline logs and records them but
//! never fails a run because of one.

use crate::frame::Frame;
use crate::Result;

use serde::Serialize;

/// Outcome of a quality check on one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualityReport {
    pub passed: bool,
    pub total_rows: usize,
    pub duplicate_rows: usize,
    pub message: String,
}

/// Check a finished table for emptiness and full-row duplicates
pub fn check_quality<F: Frame>(table: &F) -> Result<QualityReport> {
    let total_rows = table.num_rows();
    if total_rows == 0 {
        return Ok(QualityReport {
            passed: false,
            total_rows,
            duplicate_rows: 0,
            message: "Data quality check failed. Table has 0 records.".to_string(),
        });
    }

    let distinct_rows = table.drop_duplicates(None)?.num_rows();
    let duplicate_rows = total_rows - distinct_rows;

    if duplicate_rows == 0 {
        Ok(QualityReport {
            passed: true,
            total_rows,
            duplicate_rows,
            message: format!(
                "Data quality check passed. Table has {} records and no duplicates.",
                total_rows
            ),
        })
    } else {
        Ok(QualityReport {
            passed: false,
            total_rows,
            duplicate_rows,
            message: format!(
                "Data quality check failed. Table has {} duplicates out of {} records.",
                duplicate_rows, total_rows
            ),
        })
    }
}
