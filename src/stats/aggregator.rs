//! Aggregator Module
//! Derived per-row metrics and per-location views of the cleaned table.

use crate::data::columns::{DATE, DEATH_RATE, LOCATION, TOTAL_CASES, TOTAL_DEATHS};
use crate::data::interpolate::date_from_day;
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Dated values of one column for one location.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationSeries {
    pub location: String,
    pub points: Vec<(NaiveDate, f64)>,
}

fn strings(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, AggregateError> {
    let values = df.column(name)?.cast(&DataType::String)?;
    Ok(values
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

fn floats(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, AggregateError> {
    let values = df.column(name)?.cast(&DataType::Float64)?;
    Ok(values.f64()?.into_iter().collect())
}

fn days(df: &DataFrame) -> Result<Vec<Option<i32>>, AggregateError> {
    let values = df.column(DATE)?.cast(&DataType::Int32)?;
    Ok(values.i32()?.into_iter().collect())
}

/// Handles derived metrics and snapshot views.
pub struct Aggregator;

impl Aggregator {
    /// Death rate for one row. Zero cases gives NaN rather than an error.
    pub fn death_rate(deaths: f64, cases: f64) -> f64 {
        if cases == 0.0 {
            f64::NAN
        } else {
            deaths / cases
        }
    }

    /// Add `death_rate = total_deaths / total_cases` as a Float64 column.
    pub fn add_death_rate(df: &mut DataFrame) -> Result<(), AggregateError> {
        let deaths = floats(df, TOTAL_DEATHS)?;
        let cases = floats(df, TOTAL_CASES)?;

        let rates: Vec<Option<f64>> = deaths
            .into_iter()
            .zip(cases)
            .map(|(d, c)| Some(Self::death_rate(d?, c?)))
            .collect();

        df.with_column(Column::new(DEATH_RATE.into(), rates))?;
        Ok(())
    }

    /// One row per location: the row with the latest date, ordered by
    /// location name. Ties on the latest date go to the later row.
    pub fn latest_snapshot(df: &DataFrame) -> Result<DataFrame, AggregateError> {
        let locations = strings(df, LOCATION)?;
        let dates = days(df)?;

        let mut latest: BTreeMap<String, (i32, usize)> = BTreeMap::new();
        for (row, (loc, day)) in locations.into_iter().zip(dates).enumerate() {
            let (Some(loc), Some(day)) = (loc, day) else {
                continue;
            };
            latest
                .entry(loc)
                .and_modify(|best| {
                    if day >= best.0 {
                        *best = (day, row);
                    }
                })
                .or_insert((day, row));
        }

        let indices: Vec<IdxSize> = latest.values().map(|&(_, row)| row as IdxSize).collect();
        let idx = IdxCa::new("idx".into(), indices);
        Ok(df.take(&idx)?)
    }

    /// Per-location series of `column`, ordered by location name.
    ///
    /// Returns `None` when the column is absent. Null and non-finite values
    /// are left out of the points.
    pub fn location_series(
        df: &DataFrame,
        column: &str,
    ) -> Result<Option<Vec<LocationSeries>>, AggregateError> {
        if df.column(column).is_err() {
            return Ok(None);
        }

        let locations = strings(df, LOCATION)?;
        let dates = days(df)?;
        let values = floats(df, column)?;

        let mut by_location: BTreeMap<String, Vec<(NaiveDate, f64)>> = BTreeMap::new();
        for ((loc, day), value) in locations.into_iter().zip(dates).zip(values) {
            let Some(loc) = loc else { continue };
            let points = by_location.entry(loc).or_default();
            if let (Some(date), Some(v)) = (day.and_then(date_from_day), value) {
                if v.is_finite() {
                    points.push((date, v));
                }
            }
        }

        Ok(Some(
            by_location
                .into_iter()
                .map(|(location, points)| LocationSeries { location, points })
                .collect(),
        ))
    }

    /// Text values of `column`, one per row.
    pub fn column_labels(df: &DataFrame, column: &str) -> Result<Vec<Option<String>>, AggregateError> {
        strings(df, column)
    }

    /// Finite numeric values of `column`, one per row. NaN and infinities become `None`.
    pub fn column_values(df: &DataFrame, column: &str) -> Result<Vec<Option<f64>>, AggregateError> {
        Ok(floats(df, column)?
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()))
            .collect())
    }

    /// `(label, value)` per row, e.g. location and total cases of a snapshot.
    pub fn latest_values(
        snapshot: &DataFrame,
        label_col: &str,
        value_col: &str,
    ) -> Result<Vec<(String, Option<f64>)>, AggregateError> {
        let labels = strings(snapshot, label_col)?;
        let values = floats(snapshot, value_col)?;

        Ok(labels
            .into_iter()
            .zip(values)
            .filter_map(|(label, value)| label.map(|l| (l, value.filter(|v| v.is_finite()))))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataCleaner;

    fn kenya_india() -> DataFrame {
        let df = df!(
            "location" => ["Kenya", "India", "Kenya", "India"],
            "iso_code" => ["KEN", "IND", "KEN", "IND"],
            "date" => ["2021-01-05", "2021-01-02", "2021-01-01", "2021-01-03"],
            "total_cases" => [50.0, 0.0, 10.0, 20.0],
            "total_deaths" => [5.0, 0.0, 1.0, 2.0]
        )
        .unwrap();
        DataCleaner::clean(df, &["Kenya".to_string(), "India".to_string()]).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn death_rate_divides_deaths_by_cases() {
        assert_eq!(Aggregator::death_rate(5.0, 50.0), 0.1);
        assert!(Aggregator::death_rate(0.0, 0.0).is_nan());
        assert!(Aggregator::death_rate(3.0, 0.0).is_nan());
    }

    #[test]
    fn zero_cases_yield_nan_column_value() {
        let mut df = kenya_india();
        Aggregator::add_death_rate(&mut df).unwrap();

        let rates: Vec<Option<f64>> = df
            .column(DEATH_RATE)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        // India 01-02 has zero cases
        assert!(rates[0].unwrap().is_nan());
        assert_eq!(rates[1], Some(0.1));
        assert_eq!(rates[3], Some(0.1));
    }

    #[test]
    fn null_inputs_give_null_rate() {
        let mut df = df!(
            "total_cases" => [Some(10.0), None],
            "total_deaths" => [None, Some(1.0)]
        )
        .unwrap();
        Aggregator::add_death_rate(&mut df).unwrap();
        assert_eq!(df.column(DEATH_RATE).unwrap().null_count(), 2);
    }

    #[test]
    fn snapshot_takes_latest_row_per_location() {
        let df = kenya_india();
        let snapshot = Aggregator::latest_snapshot(&df).unwrap();

        assert_eq!(snapshot.height(), 2);
        let cases = Aggregator::latest_values(&snapshot, LOCATION, TOTAL_CASES).unwrap();
        assert_eq!(
            cases,
            vec![
                ("India".to_string(), Some(20.0)),
                ("Kenya".to_string(), Some(50.0)),
            ]
        );

        let dates = days(&snapshot).unwrap();
        assert_eq!(date_from_day(dates[1].unwrap()), Some(ymd(2021, 1, 5)));
    }

    #[test]
    fn snapshot_does_not_depend_on_row_order() {
        let df = df!(
            "location" => ["Kenya", "Kenya"],
            "date" => ["2021-01-05", "2021-01-01"],
            "total_cases" => [50.0, 10.0],
            "total_deaths" => [5.0, 1.0]
        )
        .unwrap();
        let df = DataCleaner::parse_dates(df).unwrap();

        let snapshot = Aggregator::latest_snapshot(&df).unwrap();
        let cases = Aggregator::latest_values(&snapshot, LOCATION, TOTAL_CASES).unwrap();
        assert_eq!(cases, vec![("Kenya".to_string(), Some(50.0))]);
    }

    #[test]
    fn series_are_grouped_and_skip_missing_values() {
        let mut df = kenya_india();
        Aggregator::add_death_rate(&mut df).unwrap();

        let series = Aggregator::location_series(&df, DEATH_RATE).unwrap().unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].location, "India");
        // NaN rate on 01-02 is left out
        assert_eq!(series[0].points, vec![(ymd(2021, 1, 3), 0.1)]);
        assert_eq!(
            series[1].points,
            vec![(ymd(2021, 1, 1), 0.1), (ymd(2021, 1, 5), 0.1)]
        );
    }

    #[test]
    fn absent_series_column_is_none() {
        let df = kenya_india();
        assert!(Aggregator::location_series(&df, "total_vaccinations")
            .unwrap()
            .is_none());
    }
}
