//! GUI module - interactive chart window

mod app;
mod chart_viewer;

pub use app::show_charts;
pub use chart_viewer::ChartViewer;
