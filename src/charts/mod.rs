//! Charts module - chart descriptions and rendering

pub mod model;
pub mod palette;
mod plotter;
mod renderer;

pub use model::{
    Bar, BarChart, Chart, ChartCollector, ChartSink, ChoroplethMap, LineChart, LineSeries,
    Region, RenderError,
};
pub use palette::ColorScale;
pub use plotter::ChartPlotter;
pub use renderer::{FileExporter, StaticChartRenderer};
