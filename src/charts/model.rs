//! Render-only chart descriptions and the sink that receives them.
//!
//! The pipeline builds these from prepared tables; renderers only draw.

use crate::charts::palette::ColorScale;
use crate::data::interpolate::{date_from_day, day_number};
use crate::stats::LocationSeries;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to create output directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("Drawing failed for {chart}: {message}")]
    Drawing { chart: String, message: String },
    #[error("Chart window failed: {0}")]
    Window(String),
}

/// One line of a line chart.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSeries {
    pub name: String,
    pub points: Vec<(NaiveDate, f64)>,
}

impl From<LocationSeries> for LineSeries {
    fn from(series: LocationSeries) -> Self {
        Self {
            name: series.location,
            points: series.points,
        }
    }
}

/// Time-series chart with one line per location.
#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub id: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<LineSeries>,
}

impl LineChart {
    /// Date and value bounds over all series, `None` when there are no points.
    pub fn bounds(&self) -> Option<((NaiveDate, NaiveDate), (f64, f64))> {
        let mut points = self.series.iter().flat_map(|s| s.points.iter());
        let &(d0, v0) = points.next()?;

        let mut dates = (d0, d0);
        let mut values = (v0, v0);
        for &(d, v) in points {
            dates = (dates.0.min(d), dates.1.max(d));
            values = (values.0.min(v), values.1.max(v));
        }
        Some((dates, values))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub id: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bars: Vec<Bar>,
}

/// One country on a choropleth, keyed by ISO code.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub iso_code: String,
    pub name: String,
    pub value: Option<f64>,
    /// Extra `(column, value)` pairs shown with the region.
    pub hover: Vec<(String, Option<f64>)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChoroplethMap {
    pub id: String,
    pub title: String,
    pub value_label: String,
    pub scale: ColorScale,
    pub regions: Vec<Region>,
}

impl ChoroplethMap {
    /// Min and max over regions with a value.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.regions
            .iter()
            .filter_map(|r| r.value)
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Position of `value` within the value range, in `[0, 1]`.
    pub fn normalized(&self, value: f64) -> f64 {
        match self.value_range() {
            Some((lo, hi)) if hi > lo => ((value - lo) / (hi - lo)).clamp(0.0, 1.0),
            Some(_) => 1.0,
            None => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Chart {
    Line(LineChart),
    Bar(BarChart),
    Choropleth(ChoroplethMap),
}

impl Chart {
    pub fn id(&self) -> &str {
        match self {
            Chart::Line(c) => &c.id,
            Chart::Bar(c) => &c.id,
            Chart::Choropleth(c) => &c.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Chart::Line(c) => &c.title,
            Chart::Bar(c) => &c.title,
            Chart::Choropleth(c) => &c.title,
        }
    }
}

/// Receives charts as the analysis produces them.
pub trait ChartSink {
    fn present(&mut self, chart: Chart) -> Result<(), RenderError>;
}

/// Keeps every chart in presentation order.
#[derive(Debug, Default)]
pub struct ChartCollector {
    charts: Vec<Chart>,
}

impl ChartCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn charts(&self) -> &[Chart] {
        &self.charts
    }

    pub fn into_charts(self) -> Vec<Chart> {
        self.charts
    }
}

impl ChartSink for ChartCollector {
    fn present(&mut self, chart: Chart) -> Result<(), RenderError> {
        self.charts.push(chart);
        Ok(())
    }
}

/// Short human label for large counts: 1.2k, 3.4M, 5.6B.
pub fn format_value(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e9 {
        format!("{:.1}B", value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.1}M", value / 1e6)
    } else if abs >= 1e3 {
        format!("{:.1}k", value / 1e3)
    } else if abs >= 1.0 || abs == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.3}", value)
    }
}

/// Axis label for a day number (days since the Unix epoch).
pub fn format_day(day: f64) -> String {
    date_from_day(day.round() as i32)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Day number of `date` as a plot coordinate.
pub fn day_coord(date: NaiveDate) -> f64 {
    f64::from(day_number(date))
}

/// File-system friendly version of a chart id.
pub fn safe_file_stem(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn region(iso: &str, value: Option<f64>) -> Region {
        Region {
            iso_code: iso.to_string(),
            name: iso.to_string(),
            value,
            hover: Vec::new(),
        }
    }

    #[test]
    fn line_bounds_cover_all_series() {
        let chart = LineChart {
            id: "t".into(),
            title: "t".into(),
            x_label: "Date".into(),
            y_label: "v".into(),
            series: vec![
                LineSeries {
                    name: "A".into(),
                    points: vec![(ymd(2021, 1, 2), 5.0), (ymd(2021, 1, 3), 1.0)],
                },
                LineSeries {
                    name: "B".into(),
                    points: vec![(ymd(2021, 1, 1), 9.0)],
                },
                LineSeries {
                    name: "C".into(),
                    points: Vec::new(),
                },
            ],
        };

        assert_eq!(
            chart.bounds(),
            Some(((ymd(2021, 1, 1), ymd(2021, 1, 3)), (1.0, 9.0)))
        );
    }

    #[test]
    fn empty_line_chart_has_no_bounds() {
        let chart = LineChart {
            id: "t".into(),
            title: "t".into(),
            x_label: String::new(),
            y_label: String::new(),
            series: Vec::new(),
        };
        assert!(chart.bounds().is_none());
    }

    #[test]
    fn choropleth_normalizes_against_present_values() {
        let map = ChoroplethMap {
            id: "m".into(),
            title: "m".into(),
            value_label: "v".into(),
            scale: ColorScale::Plasma,
            regions: vec![
                region("KEN", Some(10.0)),
                region("IND", Some(30.0)),
                region("USA", None),
            ],
        };

        assert_eq!(map.value_range(), Some((10.0, 30.0)));
        assert_eq!(map.normalized(20.0), 0.5);
        assert_eq!(map.normalized(99.0), 1.0);
    }

    #[test]
    fn collector_keeps_order() {
        let mut collector = ChartCollector::new();
        for id in ["a", "b"] {
            collector
                .present(Chart::Bar(BarChart {
                    id: id.into(),
                    title: id.into(),
                    x_label: String::new(),
                    y_label: String::new(),
                    bars: Vec::new(),
                }))
                .unwrap();
        }
        let ids: Vec<&str> = collector.charts().iter().map(Chart::id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn formats_values_and_days() {
        assert_eq!(format_value(1_500.0), "1.5k");
        assert_eq!(format_value(2_300_000.0), "2.3M");
        assert_eq!(format_value(0.0123), "0.012");
        assert_eq!(format_value(0.0), "0");
        assert_eq!(format_day(day_coord(ymd(2021, 6, 1))), "2021-06-01");
        assert_eq!(safe_file_stem("total cases/2"), "total_cases_2");
    }
}
