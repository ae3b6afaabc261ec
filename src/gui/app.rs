//! Chart window
//! Shows the collected line and bar charts after the pipeline has run.

use crate::charts::{Chart, RenderError};
use crate::gui::ChartViewer;
use egui::{Key, SidePanel};

const WINDOW_TITLE: &str = "COVID-19 EDA";

/// Main application window.
pub struct ChartWindow {
    chart_viewer: ChartViewer,
}

impl ChartWindow {
    pub fn new(_cc: &eframe::CreationContext<'_>, charts: Vec<Chart>) -> Self {
        Self {
            chart_viewer: ChartViewer::new(charts),
        }
    }
}

impl eframe::App for ChartWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Arrow keys page through charts
        if ctx.input(|i| i.key_pressed(Key::ArrowDown) || i.key_pressed(Key::ArrowRight)) {
            self.chart_viewer.select_next();
        }
        if ctx.input(|i| i.key_pressed(Key::ArrowUp) || i.key_pressed(Key::ArrowLeft)) {
            self.chart_viewer.select_previous();
        }

        SidePanel::left("chart_list")
            .min_width(260.0)
            .max_width(340.0)
            .show(ctx, |ui| {
                ui.heading(format!("Charts ({})", self.chart_viewer.len()));
                ui.separator();
                self.chart_viewer.show_list(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show_chart(ui);
        });
    }
}

/// Open the chart window and block until it is closed.
pub fn show_charts(charts: Vec<Chart>) -> Result<(), RenderError> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([900.0, 600.0])
            .with_title(WINDOW_TITLE),
        ..Default::default()
    };

    eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(move |cc| Ok(Box::new(ChartWindow::new(cc, charts)))),
    )
    .map_err(|e| RenderError::Window(e.to_string()))
}
