//! Analysis pipeline: load → clean → EDA → vaccinations → choropleth.
//!
//! Each step hands finished charts to a [`ChartSink`]; nothing is drawn here.

use crate::charts::{
    Bar, BarChart, Chart, ChartSink, ChoroplethMap, ColorScale, LineChart, Region, RenderError,
};
use crate::config::AnalysisConfig;
use crate::data::columns::{
    DEATH_RATE, ISO_CODE, LOCATION, NEW_CASES, PEOPLE_VACCINATED_PER_HUNDRED, TOTAL_CASES,
    TOTAL_DEATHS, TOTAL_VACCINATIONS,
};
use crate::data::{CleanerError, DataCleaner, DataLoader, DatasetSummary, LoaderError};
use crate::stats::{AggregateError, Aggregator};
use polars::prelude::*;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error(transparent)]
    Cleaner(#[from] CleanerError),
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// What an optional step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Number of charts handed to the sink
    Completed(usize),
    /// A required column was missing
    Skipped,
}

/// Result of a full run.
#[derive(Debug)]
pub struct PipelineReport {
    pub raw: DatasetSummary,
    pub cleaned: DataFrame,
    pub eda: StepOutcome,
    pub vaccinations: StepOutcome,
    pub choropleth: StepOutcome,
}

fn has_column(df: &DataFrame, name: &str) -> bool {
    df.column(name).is_ok()
}

/// Line chart of `column` by location, `None` when the column is absent.
fn line_chart(
    df: &DataFrame,
    column: &str,
    title: &str,
    y_label: &str,
) -> Result<Option<LineChart>, AggregateError> {
    let Some(series) = Aggregator::location_series(df, column)? else {
        return Ok(None);
    };
    Ok(Some(LineChart {
        id: column.to_string(),
        title: title.to_string(),
        x_label: "Date".to_string(),
        y_label: y_label.to_string(),
        series: series.into_iter().map(Into::into).collect(),
    }))
}

/// Regions for a choropleth of `value_col`. Rows without an ISO code are left out.
fn regions(
    snapshot: &DataFrame,
    value_col: &str,
    hover_cols: &[&str],
) -> Result<Vec<Region>, AggregateError> {
    let iso_codes = Aggregator::column_labels(snapshot, ISO_CODE)?;
    let names = Aggregator::column_labels(snapshot, LOCATION)?;
    let values = Aggregator::column_values(snapshot, value_col)?;
    let hover = hover_cols
        .iter()
        .filter(|c| has_column(snapshot, c))
        .map(|c| Ok((c.to_string(), Aggregator::column_values(snapshot, c)?)))
        .collect::<Result<Vec<(String, Vec<Option<f64>>)>, AggregateError>>()?;

    let mut regions = Vec::new();
    for (row, (iso_code, name)) in iso_codes.into_iter().zip(names).enumerate() {
        let (Some(iso_code), Some(name)) = (iso_code, name) else {
            continue;
        };
        regions.push(Region {
            iso_code,
            name,
            value: values[row],
            hover: hover
                .iter()
                .map(|(col, vals)| (col.clone(), vals[row]))
                .collect(),
        });
    }
    Ok(regions)
}

/// Runs the analysis steps in order.
pub struct Pipeline {
    config: AnalysisConfig,
}

impl Pipeline {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Every step, in order. Stops at the first error.
    pub fn run(&self, sink: &mut dyn ChartSink) -> Result<PipelineReport, PipelineError> {
        let (raw_df, raw) = self.load_and_explore()?;
        let mut df = DataCleaner::clean(raw_df, &self.config.countries)?;

        let eda = Self::perform_eda(&mut df, sink)?;
        let vaccinations = Self::analyze_vaccinations(&df, sink)?;
        let choropleth = Self::create_choropleth(&df, sink)?;

        Ok(PipelineReport {
            raw,
            cleaned: df,
            eda,
            vaccinations,
            choropleth,
        })
    }

    /// Load the configured file and report its shape, columns, head and nulls.
    pub fn load_and_explore(&self) -> Result<(DataFrame, DatasetSummary), PipelineError> {
        info!("Loading and exploring data...");

        let mut loader = DataLoader::new();
        loader.load_csv(&self.config.data_file)?;
        let summary = loader.summary().ok_or(LoaderError::NoData)?;

        let (rows, cols) = summary.shape();
        info!(rows, cols, "Dataset shape");
        info!("Columns: {}", summary.columns.join(", "));
        if let Some(df) = loader.get_dataframe() {
            println!("\nFirst {} rows:", self.config.preview_rows);
            println!("{}", df.head(Some(self.config.preview_rows)));
        }
        for (name, nulls) in &summary.null_counts {
            info!(column = %name, nulls, "Missing values");
        }

        Ok((loader.into_dataframe()?, summary))
    }

    /// Death rate, cumulative and daily trends, and the latest cases by country.
    pub fn perform_eda(
        df: &mut DataFrame,
        sink: &mut dyn ChartSink,
    ) -> Result<StepOutcome, PipelineError> {
        info!("Performing EDA...");

        Aggregator::add_death_rate(df)?;

        let lines = [
            (TOTAL_CASES, "Total COVID-19 Cases Over Time", "Total Cases"),
            (TOTAL_DEATHS, "Total COVID-19 Deaths Over Time", "Total Deaths"),
            (NEW_CASES, "Daily New COVID-19 Cases", "New Cases"),
            (DEATH_RATE, "COVID-19 Death Rate Over Time", "Death Rate (Deaths/Cases)"),
        ];

        let mut presented = 0;
        for (column, title, y_label) in lines {
            match line_chart(df, column, title, y_label)? {
                Some(chart) => {
                    sink.present(Chart::Line(chart))?;
                    presented += 1;
                }
                None => warn!(column, "Column not available, skipping chart"),
            }
        }

        let snapshot = Aggregator::latest_snapshot(df)?;
        let bars = Aggregator::latest_values(&snapshot, LOCATION, TOTAL_CASES)?
            .into_iter()
            .map(|(label, value)| Bar {
                label,
                value: value.unwrap_or(f64::NAN),
            })
            .collect();
        sink.present(Chart::Bar(BarChart {
            id: "latest_total_cases".to_string(),
            title: "Latest Total COVID-19 Cases by Country".to_string(),
            x_label: "Country".to_string(),
            y_label: "Total Cases".to_string(),
            bars,
        }))?;
        presented += 1;

        Ok(StepOutcome::Completed(presented))
    }

    /// Vaccination trends, skipped when the dataset has no vaccination data.
    pub fn analyze_vaccinations(
        df: &DataFrame,
        sink: &mut dyn ChartSink,
    ) -> Result<StepOutcome, PipelineError> {
        info!("Analyzing vaccination progress...");

        let Some(total) = line_chart(
            df,
            TOTAL_VACCINATIONS,
            "Total COVID-19 Vaccinations Over Time",
            "Total Vaccinations",
        )?
        else {
            warn!("Vaccination data not available in this dataset");
            return Ok(StepOutcome::Skipped);
        };
        sink.present(Chart::Line(total))?;
        let mut presented = 1;

        if let Some(rate) = line_chart(
            df,
            PEOPLE_VACCINATED_PER_HUNDRED,
            "COVID-19 Vaccination Rate (per 100 people)",
            "Vaccinated per 100 people",
        )? {
            sink.present(Chart::Line(rate))?;
            presented += 1;
        }

        Ok(StepOutcome::Completed(presented))
    }

    /// Country maps of the latest totals, skipped without ISO codes.
    pub fn create_choropleth(
        df: &DataFrame,
        sink: &mut dyn ChartSink,
    ) -> Result<StepOutcome, PipelineError> {
        info!("Creating choropleth map...");

        let snapshot = Aggregator::latest_snapshot(df)?;
        if !has_column(&snapshot, ISO_CODE) {
            warn!("ISO codes not available - cannot create choropleth");
            return Ok(StepOutcome::Skipped);
        }

        sink.present(Chart::Choropleth(ChoroplethMap {
            id: "map_total_cases".to_string(),
            title: "World Map of Total COVID-19 Cases".to_string(),
            value_label: "total_cases".to_string(),
            scale: ColorScale::Plasma,
            regions: regions(&snapshot, TOTAL_CASES, &[TOTAL_CASES, TOTAL_DEATHS])?,
        }))?;
        let mut presented = 1;

        if has_column(&snapshot, PEOPLE_VACCINATED_PER_HUNDRED) {
            sink.present(Chart::Choropleth(ChoroplethMap {
                id: "map_vaccination_rate".to_string(),
                title: "World Map of COVID-19 Vaccination Rates (per 100 people)".to_string(),
                value_label: "people_vaccinated_per_hundred".to_string(),
                scale: ColorScale::Viridis,
                regions: regions(
                    &snapshot,
                    PEOPLE_VACCINATED_PER_HUNDRED,
                    &[TOTAL_VACCINATIONS],
                )?,
            }))?;
            presented += 1;
        }

        Ok(StepOutcome::Completed(presented))
    }
}
