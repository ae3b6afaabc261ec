//! Chart Plotter Module
//! Draws line and bar charts interactively using egui_plot.

use crate::charts::model::{day_coord, format_day, format_value, BarChart, LineChart};
use crate::charts::palette::series_color;
use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart as PlotBarChart, Legend, Line, Plot, PlotPoints};

pub fn color32((r, g, b): (u8, u8, u8)) -> Color32 {
    Color32::from_rgb(r, g, b)
}

/// Draws chart descriptions into an egui `Ui`.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Time series, one line per location. X axis shows dates.
    pub fn draw_line_chart(ui: &mut egui::Ui, chart: &LineChart) {
        if chart.bounds().is_none() {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No data for this chart").size(18.0));
            });
            return;
        }

        Plot::new(&chart.id)
            .legend(Legend::default())
            .x_axis_label(chart.x_label.clone())
            .y_axis_label(chart.y_label.clone())
            .x_axis_formatter(|mark, _range| format_day(mark.value))
            .y_axis_formatter(|mark, _range| format_value(mark.value))
            .show(ui, |plot_ui| {
                for (idx, series) in chart.series.iter().enumerate() {
                    let points: PlotPoints = series
                        .points
                        .iter()
                        .map(|&(date, value)| [day_coord(date), value])
                        .collect();

                    plot_ui.line(
                        Line::new(points)
                            .color(color32(series_color(idx)))
                            .width(2.0)
                            .name(&series.name),
                    );
                }
            });
    }

    /// One bar per label, labels on the x axis.
    pub fn draw_bar_chart(ui: &mut egui::Ui, chart: &BarChart) {
        let x_labels: Vec<String> = chart.bars.iter().map(|b| b.label.clone()).collect();

        Plot::new(&chart.id)
            .legend(Legend::default())
            .allow_drag(false)
            .x_axis_label(chart.x_label.clone())
            .y_axis_label(chart.y_label.clone())
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if idx >= 0.0 && (mark.value - idx).abs() < f64::EPSILON {
                    x_labels.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .y_axis_formatter(|mark, _range| format_value(mark.value))
            .show(ui, |plot_ui| {
                for (idx, bar) in chart.bars.iter().enumerate() {
                    let color = color32(series_color(idx));
                    let elem = Bar::new(idx as f64, bar.value).width(0.6).fill(color);
                    plot_ui.bar_chart(PlotBarChart::new(vec![elem]).color(color).name(&bar.label));
                }
            });
    }
}
