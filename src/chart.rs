//! Attendance bar chart
//!
//! `ChartConfig` serializes to the configuration object Chart.js expects.
//! Chart.js formatting callbacks are JS functions and cannot travel as JSON;
//! their Rust counterparts are [`tick_label`] and [`tooltip_label`], which the
//! browser surface wires in as closures.

use serde::Serialize;

use crate::error::Result;
use crate::interface::ChartSurface;
use crate::model::structs::AnalyticsEntry;

pub const DATASET_LABEL: &str = "Attendance Percentage";
pub const Y_AXIS_MAX: u32 = 100;

const BACKGROUND_COLORS: [&str; 4] = [
    "rgba(59, 130, 246, 0.8)",
    "rgba(16, 185, 129, 0.8)",
    "rgba(245, 158, 11, 0.8)",
    "rgba(239, 68, 68, 0.8)",
];

const BORDER_COLORS: [&str; 4] = [
    "rgb(59, 130, 246)",
    "rgb(16, 185, 129)",
    "rgb(245, 158, 11)",
    "rgb(239, 68, 68)",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: ChartData,
    pub options: ChartOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<BarDataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BarDataset {
    pub label: String,
    pub data: Vec<f64>,
    pub background_color: Vec<String>,
    pub border_color: Vec<String>,
    pub border_width: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartOptions {
    pub responsive: bool,
    pub scales: Scales,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scales {
    pub y: LinearAxis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinearAxis {
    pub begin_at_zero: bool,
    pub max: u32,
}

impl ChartConfig {
    /// One bar per course, colored from a fixed palette that repeats after four bars.
    pub fn attendance(analytics: &[AnalyticsEntry]) -> Self {
        let labels = analytics.iter().map(|e| e.course_name.clone()).collect();
        let data = analytics.iter().map(|e| e.percentage).collect();

        Self {
            kind: "bar".to_string(),
            data: ChartData {
                labels,
                datasets: vec![BarDataset {
                    label: DATASET_LABEL.to_string(),
                    data,
                    background_color: cycle_palette(&BACKGROUND_COLORS, analytics.len()),
                    border_color: cycle_palette(&BORDER_COLORS, analytics.len()),
                    border_width: 1,
                }],
            },
            options: ChartOptions {
                responsive: true,
                scales: Scales {
                    y: LinearAxis {
                        begin_at_zero: true,
                        max: Y_AXIS_MAX,
                    },
                },
            },
        }
    }
}

fn cycle_palette(palette: &[&str], len: usize) -> Vec<String> {
    palette
        .iter()
        .cycle()
        .take(len)
        .map(|c| c.to_string())
        .collect()
}

/// Y-axis tick text: "80%".
pub fn tick_label(value: f64) -> String {
    format!("{value}%")
}

/// Tooltip text: "Attendance Percentage: 80%".
pub fn tooltip_label(dataset_label: &str, value: f64) -> String {
    format!("{dataset_label}: {value}%")
}

/// Draw the attendance chart into the canvas named `canvas_id`.
///
/// Returns `Ok(false)` without touching the surface's drawing side when the
/// canvas does not exist.
pub fn render_attendance_chart<S: ChartSurface>(
    surface: &S,
    canvas_id: &str,
    analytics: &[AnalyticsEntry],
) -> Result<bool> {
    let Some(canvas) = surface.find_canvas(canvas_id) else {
        log::debug!("No #{canvas_id} element, skipping chart");
        return Ok(false);
    };

    let config = ChartConfig::attendance(analytics);
    surface.draw(canvas, &config)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingSurface {
        canvases: Vec<&'static str>,
        drawn: RefCell<Vec<(String, ChartConfig)>>,
    }

    impl ChartSurface for RecordingSurface {
        type Canvas = String;

        fn find_canvas(&self, id: &str) -> Option<String> {
            self.canvases.contains(&id).then(|| id.to_string())
        }

        fn draw(&self, canvas: String, config: &ChartConfig) -> Result<()> {
            self.drawn.borrow_mut().push((canvas, config.clone()));
            Ok(())
        }
    }

    fn sample() -> Vec<AnalyticsEntry> {
        vec![
            AnalyticsEntry::new("Math", 80.0),
            AnalyticsEntry::new("CS", 95.0),
        ]
    }

    #[test]
    fn draws_one_bar_per_course() {
        let surface = RecordingSurface {
            canvases: vec!["attendanceChart"],
            ..Default::default()
        };

        assert!(render_attendance_chart(&surface, "attendanceChart", &sample()).unwrap());

        let drawn = surface.drawn.borrow();
        assert_eq!(drawn.len(), 1);
        let (canvas, config) = &drawn[0];
        assert_eq!(canvas, "attendanceChart");
        assert_eq!(config.data.labels, vec!["Math", "CS"]);
        assert_eq!(config.data.datasets.len(), 1);
        assert_eq!(config.data.datasets[0].data, vec![80.0, 95.0]);
        assert_eq!(config.options.scales.y.max, 100);
    }

    #[test]
    fn missing_canvas_is_a_no_op() {
        let surface = RecordingSurface::default();
        assert!(!render_attendance_chart(&surface, "attendanceChart", &sample()).unwrap());
        assert!(surface.drawn.borrow().is_empty());
    }

    #[test]
    fn palette_repeats_after_four_bars() {
        let analytics: Vec<_> = (0..6)
            .map(|i| AnalyticsEntry::new(format!("C{i}"), 50.0))
            .collect();
        let config = ChartConfig::attendance(&analytics);
        let colors = &config.data.datasets[0].background_color;
        assert_eq!(colors.len(), 6);
        assert_eq!(colors[4], colors[0]);
        assert_eq!(colors[5], colors[1]);
        assert_eq!(config.data.datasets[0].border_color[3], "rgb(239, 68, 68)");
    }

    #[test]
    fn serializes_to_chartjs_shape() {
        let value = serde_json::to_value(ChartConfig::attendance(&sample()[..1])).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "bar",
                "data": {
                    "labels": ["Math"],
                    "datasets": [{
                        "label": "Attendance Percentage",
                        "data": [80.0],
                        "backgroundColor": ["rgba(59, 130, 246, 0.8)"],
                        "borderColor": ["rgb(59, 130, 246)"],
                        "borderWidth": 1
                    }]
                },
                "options": {
                    "responsive": true,
                    "scales": { "y": { "beginAtZero": true, "max": 100 } }
                }
            })
        );
    }

    #[test]
    fn labels_carry_percent_suffix() {
        assert_eq!(tick_label(80.0), "80%");
        assert_eq!(tick_label(12.5), "12.5%");
        assert_eq!(tooltip_label(DATASET_LABEL, 95.0), "Attendance Percentage: 95%");
    }
}
