//! COVID-19 EDA - runs the analysis once and shows the charts.

use anyhow::Context;
use covid_eda::charts::{Chart, ChartCollector, ChartSink, FileExporter};
use covid_eda::config::CONFIG_FILE;
use covid_eda::{gui, logging, AnalysisConfig, DisplayMode, Pipeline};
use std::path::Path;
use tracing::info;

fn main() -> anyhow::Result<()> {
    logging::init_logger()?;

    let config = AnalysisConfig::load_or_default(Path::new(CONFIG_FILE))?;
    info!(
        "Analyzing {} for {}",
        config.data_file.display(),
        config.countries.join(", ")
    );

    let pipeline = Pipeline::new(config.clone());
    let mut collector = ChartCollector::new();
    let report = pipeline
        .run(&mut collector)
        .with_context(|| format!("analysis of {} failed", config.data_file.display()))?;

    info!(
        rows = report.cleaned.height(),
        eda = ?report.eda,
        vaccinations = ?report.vaccinations,
        choropleth = ?report.choropleth,
        "Analysis complete"
    );

    present(&config, collector.into_charts())
}

/// Show or export the collected charts according to the display mode.
fn present(config: &AnalysisConfig, charts: Vec<Chart>) -> anyhow::Result<()> {
    match config.display {
        DisplayMode::Files => {
            let mut exporter = FileExporter::from_config(config);
            for chart in charts {
                exporter.present(chart)?;
            }
            info!("{} charts written", exporter.written().len());
        }
        DisplayMode::Window => {
            // Maps go to the browser, everything else to the window
            let (maps, plots): (Vec<Chart>, Vec<Chart>) = charts
                .into_iter()
                .partition(|c| matches!(c, Chart::Choropleth(_)));

            let mut exporter = FileExporter::from_config(config);
            for map in maps {
                exporter.present(map)?;
            }
            gui::show_charts(plots)?;
        }
    }
    Ok(())
}
