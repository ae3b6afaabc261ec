//! CSV Data Loader Module
//! Handles CSV file loading and dataset exploration using Polars.

use crate::data::columns::NUMERIC;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

const INFER_SCHEMA_ROWS: usize = 10_000;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Data file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("No data loaded")]
    NoData,
}

/// Shape and per-column null counts of a loaded table.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    pub rows: usize,
    pub columns: Vec<String>,
    pub null_counts: Vec<(String, usize)>,
}

impl DatasetSummary {
    pub fn of(df: &DataFrame) -> Self {
        Self {
            rows: df.height(),
            columns: column_names(df),
            null_counts: null_counts(df, None),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.columns.len())
    }
}

/// Null count for each column, or only for `subset` when given.
///
/// Names in `subset` that are not in the frame are skipped.
pub fn null_counts(df: &DataFrame, subset: Option<&[&str]>) -> Vec<(String, usize)> {
    match subset {
        Some(names) => names
            .iter()
            .filter_map(|name| {
                df.column(name)
                    .ok()
                    .map(|col| (name.to_string(), col.null_count()))
            })
            .collect(),
        None => df
            .get_columns()
            .iter()
            .map(|col| (col.name().to_string(), col.null_count()))
            .collect(),
    }
}

pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Float64 overrides for the numeric columns present in the file.
///
/// Types are inferred from the first rows only, so an integer-looking column
/// with a fractional value further down would otherwise be read as null.
fn numeric_overrides(file_path: &Path) -> Result<Schema, LoaderError> {
    let sampled = LazyCsvReader::new(file_path)
        .with_has_header(true)
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .finish()?
        .collect_schema()?;

    Ok(sampled
        .iter()
        .filter(|(name, dtype)| dtype.is_integer() || NUMERIC.contains(&name.as_str()))
        .map(|(name, _)| (name.clone(), DataType::Float64))
        .collect())
}

/// Handles CSV file loading with Polars.
pub struct DataLoader {
    df: Option<DataFrame>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self { df: None }
    }

    /// Load a CSV file using Polars. Row order follows the file.
    pub fn load_csv(&mut self, file_path: &Path) -> Result<&DataFrame, LoaderError> {
        if !file_path.exists() {
            return Err(LoaderError::FileNotFound(file_path.to_path_buf()));
        }

        let overrides = numeric_overrides(file_path)?;
        debug!(columns = overrides.len(), "Numeric columns read as Float64");

        let df = LazyCsvReader::new(file_path)
            .with_has_header(true)
            .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
            .with_dtype_overwrite(Some(Arc::new(overrides)))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;

        self.df = Some(df);
        self.df.as_ref().ok_or(LoaderError::NoData)
    }

    pub fn summary(&self) -> Option<DatasetSummary> {
        self.df.as_ref().map(DatasetSummary::of)
    }

    /// Get a reference to the loaded DataFrame.
    pub fn get_dataframe(&self) -> Option<&DataFrame> {
        self.df.as_ref()
    }

    /// Hand the loaded DataFrame over to the caller.
    pub fn into_dataframe(self) -> Result<DataFrame, LoaderError> {
        self.df.ok_or(LoaderError::NoData)
    }
}
