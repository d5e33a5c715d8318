//! Calendar dimension

use super::dates::{epoch_offsets_to_dates, sas_epoch};
use crate::frame::{non_null_mask, Frame};
use crate::schema::{
    ColumnMapping, ARRIVAL_DATE_FIELD, DAY_FIELD, DIM_CALENDAR, MONTH_FIELD,
    SURROGATE_ID_FIELD, WEEKDAY_FIELD, WEEK_FIELD, YEAR_FIELD,
};
use crate::{Error, Result};

use arrow_array::cast::AsArray;
use arrow_array::types::Date32Type;
use arrow_array::{Array, Int32Array, Int64Array};
use chrono::{Datelike, NaiveDate};
use std::sync::Arc;

/// Build `dim_calendar` from the cleaned immigration dataset.
///
/// One row per distinct non-null arrival date, ordered by date, with `id`
/// counting up from 0. `week` is the ISO week number and `weekday` runs
/// from 1 (Sunday) to 7 (Saturday).
pub fn build_calendar<F: Frame>(immigration: &F) -> Result<F> {
    let arrivals = immigration.project(&[ColumnMapping::keep(ARRIVAL_DATE_FIELD)])?;
    let dates = epoch_offsets_to_dates(
        arrivals.column(ARRIVAL_DATE_FIELD)?.as_ref(),
        sas_epoch(),
    )?;
    let present = non_null_mask(&dates)?;

    let calendar = arrivals
        .with_column(ARRIVAL_DATE_FIELD, Arc::new(dates))?
        .filter(&present)?
        .drop_duplicates(None)?
        .sort_by(ARRIVAL_DATE_FIELD)?;

    let days: Vec<NaiveDate> = {
        let column = calendar.column(ARRIVAL_DATE_FIELD)?;
        let column = column.as_primitive::<Date32Type>();
        (0..column.len())
            .map(|i| {
                column.value_as_date(i).ok_or_else(|| {
                    Error::Internal(format!("calendar date at row {} is out of range", i))
                })
            })
            .collect::<Result<_>>()?
    };

    let ids = Int64Array::from_iter_values(0..days.len() as i64);
    let part = |f: fn(&NaiveDate) -> i32| -> Arc<Int32Array> {
        Arc::new(Int32Array::from_iter_values(days.iter().map(f)))
    };

    calendar
        .with_column(SURROGATE_ID_FIELD, Arc::new(ids))?
        .with_column(YEAR_FIELD, part(|d: &NaiveDate| d.year()))?
        .with_column(MONTH_FIELD, part(|d: &NaiveDate| d.month() as i32))?
        .with_column(DAY_FIELD, part(|d: &NaiveDate| d.day() as i32))?
        .with_column(WEEK_FIELD, part(|d: &NaiveDate| d.iso_week().week() as i32))?
        .with_column(
            WEEKDAY_FIELD,
            part(|d: &NaiveDate| d.weekday().number_from_sunday() as i32),
        )?
        .project(DIM_CALENDAR.columns)
}
