//! Immigration fact table

use super::dates::{epoch_offsets_to_dates, sas_epoch};
use crate::frame::Frame;
use crate::schema::{ARRIVAL_DATE_FIELD, FACT_IMMIGRATION};
use crate::Result;

use std::sync::Arc;

/// Build `fact_i94_immigration`.
///
/// `arrdate` goes through the same conversion as the calendar dimension so
/// every fact row joins to `dim_calendar.arrdate`.
pub fn build_fact<F: Frame>(immigration: &F) -> Result<F> {
    let fact = immigration.project(FACT_IMMIGRATION.columns)?;
    let arrivals = epoch_offsets_to_dates(fact.column(ARRIVAL_DATE_FIELD)?.as_ref(), sas_epoch())?;
    fact.with_column(ARRIVAL_DATE_FIELD, Arc::new(arrivals))
}
