//! Data Cleaner Module
//! Date parsing, sorting, location filtering and gap repair for the
//! per-country observation series.

use crate::data::columns::{CRITICAL, DATE, INTERPOLATED, LOCATION, TOTAL_CASES, TOTAL_DEATHS};
use crate::data::interpolate::{day_number, interpolate_by_time};
use crate::data::loader::null_counts;
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::ops::Range;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum CleanerError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Unparseable date {value:?} at row {row}")]
    InvalidDate { row: usize, value: String },
}

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Parse one date cell. Date-times are truncated to the day.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Contiguous row ranges sharing the same location.
///
/// Meaningful on a frame sorted by location.
pub fn location_runs(df: &DataFrame) -> Result<Vec<Range<usize>>, CleanerError> {
    let locations = df.column(LOCATION)?.cast(&DataType::String)?;
    let locations = locations.str()?;

    let mut runs = Vec::new();
    let mut start = 0;
    let mut current: Option<&str> = None;

    for (i, loc) in locations.into_iter().enumerate() {
        if i > 0 && loc != current {
            runs.push(start..i);
            start = i;
        }
        current = loc;
    }
    if df.height() > 0 {
        runs.push(start..df.height());
    }

    Ok(runs)
}

/// Day numbers of the `date` column, which must already be typed `Date`.
fn day_numbers(df: &DataFrame) -> Result<Vec<Option<i32>>, CleanerError> {
    let days = df.column(DATE)?.cast(&DataType::Int32)?;
    Ok(days.i32()?.into_iter().collect())
}

fn float_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, CleanerError> {
    let values = df.column(name)?.cast(&DataType::Float64)?;
    Ok(values.f64()?.into_iter().collect())
}

/// Handles cleaning of the observation table.
pub struct DataCleaner;

impl DataCleaner {
    /// Run every cleaning step and return the cleaned table.
    pub fn clean(df: DataFrame, targets: &[String]) -> Result<DataFrame, CleanerError> {
        info!("Cleaning data...");

        let df = Self::parse_dates(df)?;
        let df = Self::sort_by_location_and_date(&df)?;
        let df = Self::filter_locations(&df, targets)?;
        let mut df = Self::drop_incomplete(&df)?;
        Self::coerce_numeric(&mut df, &[TOTAL_CASES, TOTAL_DEATHS])?;
        Self::interpolate_gaps(&mut df)?;

        let (rows, cols) = df.shape();
        info!(rows, cols, "After cleaning");
        let watched: Vec<&str> = CRITICAL.iter().chain(INTERPOLATED.iter()).copied().collect();
        for (name, nulls) in null_counts(&df, Some(watched.as_slice())) {
            info!(column = %name, nulls, "Missing values");
        }

        Ok(df)
    }

    /// Replace the `date` column with a polars `Date` column.
    ///
    /// Nulls stay null; any other unparseable value aborts.
    pub fn parse_dates(mut df: DataFrame) -> Result<DataFrame, CleanerError> {
        let column = df.column(DATE)?;
        if column.dtype() == &DataType::Date {
            return Ok(df);
        }

        let raw = column.cast(&DataType::String)?;
        let days = raw
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value {
                None => Ok(None),
                Some(s) => parse_date(s)
                    .map(|date| Some(day_number(date)))
                    .ok_or_else(|| CleanerError::InvalidDate {
                        row,
                        value: s.to_string(),
                    }),
            })
            .collect::<Result<Vec<Option<i32>>, CleanerError>>()?;

        let dates = Column::new(DATE.into(), days).cast(&DataType::Date)?;
        df.with_column(dates)?;
        Ok(df)
    }

    /// Stable sort by (location, date) ascending.
    pub fn sort_by_location_and_date(df: &DataFrame) -> Result<DataFrame, CleanerError> {
        let sorted = df.sort(
            [LOCATION, DATE],
            SortMultipleOptions::default().with_maintain_order(true),
        )?;
        Ok(sorted)
    }

    /// Keep rows whose location is one of `targets`. Others are dropped silently.
    pub fn filter_locations(df: &DataFrame, targets: &[String]) -> Result<DataFrame, CleanerError> {
        let locations = df.column(LOCATION)?.cast(&DataType::String)?;
        let keep: Vec<bool> = locations
            .str()?
            .into_iter()
            .map(|loc| loc.is_some_and(|l| targets.iter().any(|t| t == l)))
            .collect();

        let mask = BooleanChunked::from_slice("keep".into(), &keep);
        Ok(df.filter(&mask)?)
    }

    /// Drop rows missing any critical field. NaN counts as missing.
    pub fn drop_incomplete(df: &DataFrame) -> Result<DataFrame, CleanerError> {
        let mut keep = vec![true; df.height()];

        for name in CRITICAL {
            let column = df.column(name)?;
            for (row, flag) in keep.iter_mut().enumerate() {
                if !*flag {
                    continue;
                }
                let missing = match column.get(row)? {
                    AnyValue::Null => true,
                    AnyValue::Float64(v) => v.is_nan(),
                    AnyValue::Float32(v) => v.is_nan(),
                    _ => false,
                };
                if missing {
                    *flag = false;
                }
            }
        }

        let dropped = keep.iter().filter(|k| !**k).count();
        debug!(dropped, "Rows dropped for missing critical values");

        let mask = BooleanChunked::from_slice("keep".into(), &keep);
        Ok(df.filter(&mask)?)
    }

    /// Cast the named columns to Float64 in place.
    pub fn coerce_numeric(df: &mut DataFrame, names: &[&str]) -> Result<(), CleanerError> {
        for name in names {
            let values = df.column(name)?.cast(&DataType::Float64)?;
            df.with_column(values)?;
        }
        Ok(())
    }

    /// Time-weighted interpolation of every present interpolated column,
    /// independently per location. Absent columns are skipped.
    pub fn interpolate_gaps(df: &mut DataFrame) -> Result<(), CleanerError> {
        let runs = location_runs(df)?;
        let days = day_numbers(df)?;

        for name in INTERPOLATED {
            if df.column(name).is_err() {
                debug!(column = name, "Column absent, skipping interpolation");
                continue;
            }

            let mut values = float_values(df, name)?;
            let mut filled = 0;

            for run in &runs {
                // Rows without a date cannot be placed on the time axis.
                let rows: Vec<usize> = run.clone().filter(|&i| days[i].is_some()).collect();
                let run_days: Vec<i32> = rows.iter().filter_map(|&i| days[i]).collect();
                let mut run_values: Vec<Option<f64>> = rows.iter().map(|&i| values[i]).collect();

                filled += interpolate_by_time(&run_days, &mut run_values);

                for (&i, v) in rows.iter().zip(run_values) {
                    values[i] = v;
                }
            }

            debug!(column = name, filled, "Interpolated gaps");
            df.with_column(Column::new(name.into(), values))?;
        }

        Ok(())
    }
}
