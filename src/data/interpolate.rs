//! Time-weighted linear interpolation over a day axis.

use chrono::{Datelike, NaiveDate};

/// `NaiveDate::num_days_from_ce` of 1970-01-01. Polars `Date` is days since then.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Days since the Unix epoch.
pub fn day_number(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

/// Inverse of [`day_number`].
pub fn date_from_day(day: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(day.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?)
}

fn known(value: Option<f64>) -> Option<f64> {
    value.filter(|v| !v.is_nan())
}

/// Fill interior gaps of one series in place.
///
/// `days` must be sorted ascending and the same length as `values`. A gap is
/// a run of null (or NaN) values with a known value on both sides; each slot
/// gets the linear blend of its neighbours weighted by elapsed days. Leading
/// and trailing gaps are left untouched. Returns the number of filled slots.
pub fn interpolate_by_time(days: &[i32], values: &mut [Option<f64>]) -> usize {
    debug_assert_eq!(days.len(), values.len());

    let mut filled = 0;
    let mut left: Option<(usize, f64)> = None;

    for right in 0..values.len() {
        let Some(v1) = known(values[right]) else {
            continue;
        };

        if let Some((l, v0)) = left {
            let span = f64::from(days[right] - days[l]);

            for k in l + 1..right {
                let value = if span == 0.0 {
                    v0
                } else {
                    let t = f64::from(days[k] - days[l]) / span;
                    v0 + (v1 - v0) * t
                };
                values[k] = Some(value);
                filled += 1;
            }
        }
        left = Some((right, v1));
    }

    filled
}
