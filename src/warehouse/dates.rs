//! Epoch-offset date conversion
//!
//! I94 arrival and departure dates are stored as a number of days since
//! 1960-01-01. The calendar dimension and the fact table both convert them
//! with [`epoch_offsets_to_dates`], which keeps their date grain identical.

use crate::Result;

use arrow::compute::cast;
use arrow_array::cast::AsArray;
use arrow_array::types::Float64Type;
use arrow_array::{Array, Date32Array};
use arrow_schema::DataType;
use chrono::{Days, NaiveDate};

/// Reference date of I94 day offsets
pub fn sas_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1960, 1, 1).expect("1960-01-01 is a valid date")
}

fn unix_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).expect("1970-01-01 is a valid date")
}

/// Convert a day offset from `epoch` into a calendar date.
///
/// Missing, zero and NaN offsets have no date. Fractional offsets round
/// toward the earlier day.
pub fn offset_to_date(epoch: NaiveDate, offset: Option<f64>) -> Option<NaiveDate> {
    let offset = offset.filter(|o| o.is_finite() && *o != 0.0)?;
    let days = offset.floor() as i64;

    if days >= 0 {
        epoch.checked_add_days(Days::new(days as u64))
    } else {
        epoch.checked_sub_days(Days::new(days.unsigned_abs()))
    }
}

/// Days since 1970-01-01, the Arrow `Date32` encoding
pub fn to_date32(date: NaiveDate) -> i32 {
    date.signed_duration_since(unix_epoch()).num_days() as i32
}

/// Convert a column of day offsets (any numeric or numeric-string type)
/// into an Arrow `Date32` column
pub fn epoch_offsets_to_dates(values: &dyn Array, epoch: NaiveDate) -> Result<Date32Array> {
    let offsets = cast(values, &DataType::Float64)?;
    let offsets = offsets.as_primitive::<Float64Type>();

    Ok(offsets
        .iter()
        .map(|offset| offset_to_date(epoch, offset).map(to_date32))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_array::{Float64Array, Int64Array, StringArray};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_zero_and_missing_offsets_have_no_date() {
        assert_eq!(offset_to_date(sas_epoch(), Some(0.0)), None);
        assert_eq!(offset_to_date(sas_epoch(), None), None);
        assert_eq!(offset_to_date(sas_epoch(), Some(f64::NAN)), None);
    }

    #[test]
    fn test_offsets_from_1960() {
        assert_eq!(offset_to_date(sas_epoch(), Some(1.0)), Some(ymd(1960, 1, 2)));
        // 1960 is a leap year: day 365 is Dec 31
        assert_eq!(offset_to_date(sas_epoch(), Some(365.0)), Some(ymd(1960, 12, 31)));
        assert_eq!(offset_to_date(sas_epoch(), Some(20566.0)), Some(ymd(2016, 4, 22)));
    }

    #[test]
    fn test_negative_and_fractional_offsets() {
        assert_eq!(offset_to_date(sas_epoch(), Some(-1.0)), Some(ymd(1959, 12, 31)));
        assert_eq!(offset_to_date(sas_epoch(), Some(1.9)), Some(ymd(1960, 1, 2)));
        assert_eq!(offset_to_date(sas_epoch(), Some(-0.5)), Some(ymd(1959, 12, 31)));
    }

    #[test]
    fn test_to_date32() {
        assert_eq!(to_date32(ymd(1970, 1, 1)), 0);
        assert_eq!(to_date32(ymd(1970, 1, 2)), 1);
        assert_eq!(to_date32(ymd(1960, 1, 1)), -3653);
    }

    #[test]
    fn test_column_conversion_from_float() {
        let values = Float64Array::from(vec![Some(20566.0), None, Some(0.0), Some(1.0)]);
        let dates = epoch_offsets_to_dates(&values, sas_epoch()).unwrap();

        assert_eq!(dates.len(), 4);
        assert_eq!(dates.value_as_date(0), Some(ymd(2016, 4, 22)));
        assert!(dates.is_null(1));
        assert!(dates.is_null(2));
        assert_eq!(dates.value_as_date(3), Some(ymd(1960, 1, 2)));
    }

    #[test]
    fn test_column_conversion_from_other_types() {
        let ints = Int64Array::from(vec![1, 365]);
        let dates = epoch_offsets_to_dates(&ints, sas_epoch()).unwrap();
        assert_eq!(dates.value_as_date(1), Some(ymd(1960, 12, 31)));

        let strings = StringArray::from(vec![Some("1"), Some("not a number"), None]);
        let dates = epoch_offsets_to_dates(&strings, sas_epoch()).unwrap();
        assert_eq!(dates.value_as_date(0), Some(ymd(1960, 1, 2)));
        assert!(dates.is_null(1));
        assert!(dates.is_null(2));
    }
}
