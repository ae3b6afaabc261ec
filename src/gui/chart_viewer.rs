//! Chart Viewer Widget
//! Chart list on the left, selected chart on the right.

use crate::charts::{Chart, ChartPlotter};
use egui::{RichText, ScrollArea};

/// Line and bar charts in presentation order with one selected.
#[derive(Default)]
pub struct ChartViewer {
    charts: Vec<Chart>,
    selected: usize,
}

impl ChartViewer {
    /// Keep the charts the window can draw. Choropleths are left out.
    pub fn new(charts: Vec<Chart>) -> Self {
        let charts = charts
            .into_iter()
            .filter(|c| matches!(c, Chart::Line(_) | Chart::Bar(_)))
            .collect();
        Self {
            charts,
            selected: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    pub fn selected(&self) -> Option<&Chart> {
        self.charts.get(self.selected)
    }

    pub fn select(&mut self, idx: usize) {
        if idx < self.charts.len() {
            self.selected = idx;
        }
    }

    pub fn select_next(&mut self) {
        if !self.charts.is_empty() {
            self.selected = (self.selected + 1) % self.charts.len();
        }
    }

    pub fn select_previous(&mut self) {
        if !self.charts.is_empty() {
            self.selected = (self.selected + self.charts.len() - 1) % self.charts.len();
        }
    }

    /// Selectable chart titles.
    pub fn show_list(&mut self, ui: &mut egui::Ui) {
        if self.is_empty() {
            ui.label("No charts to show");
            return;
        }
        let mut clicked = None;
        ScrollArea::vertical().show(ui, |ui| {
            for (idx, chart) in self.charts.iter().enumerate() {
                if ui
                    .selectable_label(idx == self.selected, chart.title())
                    .clicked()
                {
                    clicked = Some(idx);
                }
            }
        });
        if let Some(idx) = clicked {
            self.select(idx);
        }
    }

    /// The selected chart, full size.
    pub fn show_chart(&self, ui: &mut egui::Ui) {
        let Some(chart) = self.selected() else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        ui.label(RichText::new(chart.title()).size(18.0).strong());
        ui.add_space(8.0);
        match chart {
            Chart::Line(line) => ChartPlotter::draw_line_chart(ui, line),
            Chart::Bar(bar) => ChartPlotter::draw_bar_chart(ui, bar),
            Chart::Choropleth(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{BarChart, ChoroplethMap, ColorScale};

    fn bar(id: &str) -> Chart {
        Chart::Bar(BarChart {
            id: id.into(),
            title: id.into(),
            x_label: String::new(),
            y_label: String::new(),
            bars: Vec::new(),
        })
    }

    #[test]
    fn choropleths_are_not_listed() {
        let map = Chart::Choropleth(ChoroplethMap {
            id: "map".into(),
            title: "map".into(),
            value_label: String::new(),
            scale: ColorScale::Viridis,
            regions: Vec::new(),
        });
        let viewer = ChartViewer::new(vec![bar("a"), map, bar("b")]);
        assert_eq!(viewer.len(), 2);
    }

    #[test]
    fn selection_wraps_both_ways() {
        let mut viewer = ChartViewer::new(vec![bar("a"), bar("b"), bar("c")]);
        viewer.select_previous();
        assert_eq!(viewer.selected().map(Chart::id), Some("c"));
        viewer.select_next();
        assert_eq!(viewer.selected().map(Chart::id), Some("a"));
        viewer.select(7);
        assert_eq!(viewer.selected().map(Chart::id), Some("a"));
    }

    #[test]
    fn empty_viewer_has_no_selection() {
        let mut viewer = ChartViewer::new(Vec::new());
        viewer.select_next();
        assert!(viewer.is_empty());
        assert!(viewer.selected().is_none());
    }
}
