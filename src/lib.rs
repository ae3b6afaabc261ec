//! COVID-19 EDA - CSV cleaning, interpolation and chart pipeline
//!
//! Loads the OWID COVID-19 dataset, repairs the per-country series, derives
//! death rates and latest snapshots, and renders line, bar and choropleth
//! charts.

pub mod charts;
pub mod config;
pub mod data;
pub mod gui;
pub mod logging;
pub mod pipeline;
pub mod stats;

pub use config::{AnalysisConfig, DisplayMode};
pub use pipeline::{Pipeline, PipelineError, PipelineReport, StepOutcome};
