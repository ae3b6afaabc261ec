//! Static Chart Renderer
//! Draws chart descriptions with plotters.
//!
//! Line and bar charts are written as PNG. Choropleths are written as SVG so
//! they open in the browser: one tile per ISO code, colored on a continuous
//! scale, with a color bar on the right.

use crate::charts::model::{
    day_coord, format_day, format_value, safe_file_stem, BarChart, Chart, ChartSink,
    ChoroplethMap, LineChart, RenderError,
};
use crate::charts::palette::{series_color, NO_DATA};
use crate::config::AnalysisConfig;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const FONT: &str = "sans-serif";
const CHART_SIZE: (u32, u32) = (1200, 600);
const MAP_SIZE: (u32, u32) = (1200, 700);
const COLOR_BAR_WIDTH: i32 = 150;
const TILE_GAP: i32 = 12;

fn rgb((r, g, b): (u8, u8, u8)) -> RGBColor {
    RGBColor(r, g, b)
}

/// Pad a `(min, max)` pair so flat data still gets a visible axis.
fn padded(lo: f64, hi: f64) -> (f64, f64) {
    if hi > lo {
        let pad = (hi - lo) * 0.05;
        (lo - pad, hi + pad)
    } else {
        (lo - 1.0, hi + 1.0)
    }
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Line chart, one colored line per location, dates on the x axis.
    pub fn render_line_png(chart: &LineChart, path: &Path) -> Result<(), Box<dyn Error>> {
        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let ((d0, d1), (v0, v1)) = match chart.bounds() {
            Some(bounds) => bounds,
            None => {
                root.titled(&format!("{} (no data)", chart.title), (FONT, 26))?;
                root.present()?;
                return Ok(());
            }
        };
        let (x0, x1) = padded(day_coord(d0), day_coord(d1));
        let (y0, y1) = padded(v0, v1);

        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, (FONT, 26))
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(90)
            .build_cartesian_2d(x0..x1, y0..y1)?;

        ctx.configure_mesh()
            .x_desc(chart.x_label.as_str())
            .y_desc(chart.y_label.as_str())
            .x_labels(8)
            .x_label_formatter(&|x| format_day(*x))
            .y_label_formatter(&|y| format_value(*y))
            .draw()?;

        for (idx, series) in chart.series.iter().enumerate() {
            let color = rgb(series_color(idx));
            ctx.draw_series(LineSeries::new(
                series.points.iter().map(|&(d, v)| (day_coord(d), v)),
                color.stroke_width(2),
            ))?
            .label(series.name.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        }

        ctx.configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    }

    /// Vertical bar chart, one bar per label.
    pub fn render_bar_png(chart: &BarChart, path: &Path) -> Result<(), Box<dyn Error>> {
        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let n = chart.bars.len().max(1) as u32;
        let max = chart
            .bars
            .iter()
            .map(|b| b.value)
            .filter(|v| v.is_finite())
            .fold(0.0_f64, f64::max);
        let y_max = if max > 0.0 { max * 1.1 } else { 1.0 };

        let labels: Vec<String> = chart.bars.iter().map(|b| b.label.clone()).collect();
        let x_formatter = |v: &SegmentValue<u32>| match v {
            SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
            _ => String::new(),
        };

        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, (FONT, 26))
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(90)
            .build_cartesian_2d((0u32..n).into_segmented(), 0f64..y_max)?;

        ctx.configure_mesh()
            .disable_x_mesh()
            .x_desc(chart.x_label.as_str())
            .y_desc(chart.y_label.as_str())
            .x_labels(n as usize)
            .x_label_formatter(&x_formatter)
            .y_label_formatter(&|y| format_value(*y))
            .draw()?;

        ctx.draw_series(chart.bars.iter().enumerate().map(|(i, bar)| {
            let i = i as u32;
            let value = if bar.value.is_finite() { bar.value } else { 0.0 };
            let mut rect = Rectangle::new(
                [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), value)],
                rgb(series_color(i as usize)).filled(),
            );
            rect.set_margin(0, 0, 20, 20);
            rect
        }))?;

        root.present()?;
        Ok(())
    }

    /// Tile choropleth keyed by ISO code.
    pub fn render_choropleth_svg(map: &ChoroplethMap, path: &Path) -> Result<(), Box<dyn Error>> {
        let root = SVGBackend::new(path, MAP_SIZE).into_drawing_area();
        root.fill(&WHITE)?;
        let area = root.titled(&map.title, (FONT, 28))?;

        Self::draw_tiles(&area, map)?;
        Self::draw_color_bar(&area, map)?;

        root.present()?;
        Ok(())
    }

    /// Column and row count for `n` tiles, as square as possible.
    pub fn tile_grid(n: usize) -> (usize, usize) {
        if n == 0 {
            return (0, 0);
        }
        let cols = (n as f64).sqrt().ceil() as usize;
        let rows = n.div_ceil(cols);
        (cols, rows)
    }

    fn draw_tiles<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        map: &ChoroplethMap,
    ) -> Result<(), Box<dyn Error>>
    where
        DB::ErrorType: 'static,
    {
        let (width, height) = area.dim_in_pixel();
        let (cols, rows) = Self::tile_grid(map.regions.len());
        if cols == 0 {
            area.draw(&Text::new(
                "No regions with an ISO code",
                (TILE_GAP, TILE_GAP),
                (FONT, 20).into_font(),
            ))?;
            return Ok(());
        }

        let grid_w = width as i32 - COLOR_BAR_WIDTH - TILE_GAP;
        let tile_w = (grid_w - TILE_GAP) / cols as i32 - TILE_GAP;
        let tile_h = (height as i32 - TILE_GAP) / rows as i32 - TILE_GAP;

        for (idx, region) in map.regions.iter().enumerate() {
            let col = (idx % cols) as i32;
            let row = (idx / cols) as i32;
            let x0 = TILE_GAP + col * (tile_w + TILE_GAP);
            let y0 = TILE_GAP + row * (tile_h + TILE_GAP);

            let (fill, light_text) = match region.value {
                Some(v) => {
                    let t = map.normalized(v);
                    (map.scale.color_at(t), map.scale.is_dark_at(t))
                }
                None => (NO_DATA, false),
            };
            let text_color = if light_text { WHITE } else { BLACK };

            area.draw(&Rectangle::new(
                [(x0, y0), (x0 + tile_w, y0 + tile_h)],
                rgb(fill).filled(),
            ))?;
            area.draw(&Rectangle::new(
                [(x0, y0), (x0 + tile_w, y0 + tile_h)],
                BLACK.stroke_width(1),
            ))?;

            let mut lines = vec![
                (region.iso_code.clone(), 26),
                (region.name.clone(), 18),
                (
                    format!(
                        "{}: {}",
                        map.value_label,
                        region.value.map(format_value).unwrap_or_else(|| "n/a".into())
                    ),
                    16,
                ),
            ];
            for (label, value) in &region.hover {
                let value = value.map(format_value).unwrap_or_else(|| "n/a".into());
                lines.push((format!("{label}: {value}"), 14));
            }

            let mut y = y0 + 10;
            for (text, size) in lines {
                area.draw(&Text::new(
                    text,
                    (x0 + 10, y),
                    (FONT, size).into_font().color(&text_color),
                ))?;
                y += size + 6;
            }
        }

        Ok(())
    }

    fn draw_color_bar<DB: DrawingBackend>(
        area: &DrawingArea<DB, Shift>,
        map: &ChoroplethMap,
    ) -> Result<(), Box<dyn Error>>
    where
        DB::ErrorType: 'static,
    {
        let Some((lo, hi)) = map.value_range() else {
            return Ok(());
        };

        let (width, height) = area.dim_in_pixel();
        let x0 = width as i32 - COLOR_BAR_WIDTH + 20;
        let x1 = x0 + 30;
        let top = 40;
        let bottom = height as i32 - 40;
        let steps = 100;
        let step_h = (bottom - top) as f64 / steps as f64;

        area.draw(&Text::new(
            map.value_label.clone(),
            (x0 - 10, top - 30),
            (FONT, 14).into_font(),
        ))?;

        for s in 0..steps {
            // Top of the bar is the maximum
            let t = 1.0 - s as f64 / (steps - 1) as f64;
            let y0 = top + (s as f64 * step_h) as i32;
            let y1 = top + ((s + 1) as f64 * step_h).ceil() as i32;
            area.draw(&Rectangle::new(
                [(x0, y0), (x1, y1)],
                rgb(map.scale.color_at(t)).filled(),
            ))?;
        }
        area.draw(&Rectangle::new([(x0, top), (x1, bottom)], BLACK.stroke_width(1)))?;

        area.draw(&Text::new(format_value(hi), (x1 + 6, top), (FONT, 14).into_font()))?;
        area.draw(&Text::new(
            format_value(lo),
            (x1 + 6, bottom - 14),
            (FONT, 14).into_font(),
        ))?;

        Ok(())
    }
}

/// Writes every chart it receives into a directory.
pub struct FileExporter {
    output_dir: PathBuf,
    open_files: bool,
    written: Vec<PathBuf>,
}

impl FileExporter {
    pub fn new(output_dir: impl Into<PathBuf>, open_files: bool) -> Self {
        Self {
            output_dir: output_dir.into(),
            open_files,
            written: Vec::new(),
        }
    }

    /// Exporter for the configured output directory and open setting.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(&config.output_dir, config.open_exported)
    }

    /// Target path for a chart.
    pub fn path_for(&self, chart: &Chart) -> PathBuf {
        let ext = match chart {
            Chart::Choropleth(_) => "svg",
            Chart::Line(_) | Chart::Bar(_) => "png",
        };
        self.output_dir
            .join(format!("{}.{}", safe_file_stem(chart.id()), ext))
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl ChartSink for FileExporter {
    fn present(&mut self, chart: Chart) -> Result<(), RenderError> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.path_for(&chart);

        let result = match &chart {
            Chart::Line(c) => StaticChartRenderer::render_line_png(c, &path),
            Chart::Bar(c) => StaticChartRenderer::render_bar_png(c, &path),
            Chart::Choropleth(c) => StaticChartRenderer::render_choropleth_svg(c, &path),
        };
        result.map_err(|e| RenderError::Drawing {
            chart: chart.id().to_string(),
            message: e.to_string(),
        })?;

        info!("Wrote {} to {}", chart.title(), path.display());
        if self.open_files {
            if let Err(e) = open::that(&path) {
                warn!("Could not open {}: {}", path.display(), e);
            }
        }
        self.written.push(path);
        Ok(())
    }
}
