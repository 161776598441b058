use chrono::NaiveDate;
use lazy_static::lazy_static;
use num::NumCast;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref EPOCH: NaiveDate = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
}

/// The view parameters a dashboard session holds between interactions. Applying
/// a spec never mutates the base frame; it produces a fresh filtered copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub age: Option<i64>,
}

impl FilterSpec {
    pub fn apply(&self, df: &DataFrame) -> PolarsResult<DataFrame> {
        let in_range = date_range(df, self.start_date, self.end_date)?;
        match self.age {
            Some(age) => exact_value(&in_range, "Age", age),
            None => Ok(in_range),
        }
    }
}

/// Keeps rows whose `Year` falls inside the inclusive range, original order
/// preserved. An inverted range selects nothing rather than raising; the
/// dashboard shows an empty chart for it.
pub fn date_range(df: &DataFrame, start: NaiveDate, end: NaiveDate) -> PolarsResult<DataFrame> {
    let years = df.column("Year")?.date()?;
    let mask = years.gt_eq(days_since_epoch(start)) & years.lt_eq(days_since_epoch(end));
    df.filter(&mask)
}

/// Keeps rows where `column` equals `value` exactly. Numeric columns only,
/// which is all the dashboard needs (the age slider).
pub fn exact_value<T: NumCast + Copy>(
    df: &DataFrame,
    column: &str,
    value: T,
) -> PolarsResult<DataFrame> {
    let value: f64 = num::cast(value)
        .ok_or_else(|| PolarsError::ComputeError("filter value is not numeric".into()))?;
    let target = df.column(column)?.cast(&DataType::Float64)?;
    let mask = target.f64()?.equal(value);
    df.filter(&mask)
}

/* The Date dtype stores days since the Unix epoch, so range bounds are
compared in that unit. */
fn days_since_epoch(date: NaiveDate) -> i32 {
    (date - *EPOCH).num_days() as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader;
    use polars::df;

    fn year(y: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, 1, 1).unwrap()
    }

    fn sample() -> DataFrame {
        let df = df!(
            "Patient_ID" => &["PT1", "PT2", "PT3", "PT4"],
            "Year" => &[2015i64, 2017, 2020, 2024],
            "Age" => &[25i64, 30, 30, 71],
        )
        .unwrap();
        loader::prepare(df).unwrap()
    }

    #[test]
    fn date_range_is_inclusive_on_both_ends() {
        let out = date_range(&sample(), year(2015), year(2020)).unwrap();
        assert_eq!(out.height(), 3);
    }

    #[test]
    fn inverted_range_yields_an_empty_frame() {
        let out = date_range(&sample(), year(2018), year(2016)).unwrap();
        assert_eq!(out.height(), 0);
    }

    #[test]
    fn exact_value_matches_only_that_age() {
        let out = exact_value(&sample(), "Age", 30i64).unwrap();
        assert_eq!(out.height(), 2);
    }

    #[test]
    fn spec_composes_both_predicates() {
        let spec = FilterSpec {
            start_date: year(2016),
            end_date: year(2024),
            age: Some(30),
        };
        let out = spec.apply(&sample()).unwrap();
        assert_eq!(out.height(), 2);

        let without_age = FilterSpec { age: None, ..spec };
        assert_eq!(without_age.apply(&sample()).unwrap().height(), 3);
    }
}
