//! Immigrant dimension

use crate::frame::Frame;
use crate::schema::DIM_IMMIGRANT;
use crate::Result;

/// Build `dim_immigrant`: one row per case with the traveller attributes
pub fn build_immigrant<F: Frame>(immigration: &F) -> Result<F> {
    immigration.project(DIM_IMMIGRANT.columns)
}
