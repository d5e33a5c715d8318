//! City temperature dimension

use crate::frame::Frame;
use crate::schema::DIM_TEMPERATURES;
use crate::Result;

/// Build `dim_temperatures`: one row per (date, city) observation with
/// snake case column names
pub fn build_temperatures<F: Frame>(temperatures: &F) -> Result<F> {
    temperatures.project(DIM_TEMPERATURES.columns)
}
