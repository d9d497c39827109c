//! Chart Plotter Module
//! Interactive bar charts for query results using egui_plot.

use crate::queries::{ChartSpec, QueryResult};
use egui::Color32;
use egui_plot::{Bar, BarChart, GridMark, Plot};

pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(52, 152, 219),  // Blue
    Color32::from_rgb(231, 76, 60),   // Red
    Color32::from_rgb(46, 204, 113),  // Green
    Color32::from_rgb(155, 89, 182),  // Purple
    Color32::from_rgb(243, 156, 18),  // Orange
    Color32::from_rgb(26, 188, 156),  // Teal
    Color32::from_rgb(233, 30, 99),   // Pink
    Color32::from_rgb(0, 188, 212),   // Cyan
    Color32::from_rgb(255, 87, 34),   // Deep Orange
    Color32::from_rgb(96, 125, 139),  // Blue Grey
];

/// One bar per label, ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub title: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub value_label: String,
}

impl ChartData {
    /// Pick the label/value columns named by `spec`. Rows with a missing
    /// value are skipped.
    pub fn from_result(result: &QueryResult, spec: &ChartSpec) -> Option<Self> {
        let label_idx = result.column_index(spec.label_column)?;
        let value_idx = result.column_index(spec.value_column)?;

        let (labels, values) = result
            .rows
            .iter()
            .filter_map(|row| {
                let value = row.get(value_idx)?.as_f64()?;
                Some((row.get(label_idx)?.to_string(), value))
            })
            .unzip();

        Some(Self {
            title: result.title.clone(),
            labels,
            values,
            value_label: spec.value_label.to_string(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Draws query results with egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn bar_color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// Bar chart, X-axis: labels, Y-axis: values
    pub fn draw_bar_chart(ui: &mut egui::Ui, data: &ChartData) {
        let x_labels = data.labels.clone();
        let count = data.labels.len();

        let bars: Vec<Bar> = data
            .values
            .iter()
            .zip(data.labels.iter())
            .enumerate()
            .map(|(i, (&value, label))| {
                Bar::new(i as f64, value)
                    .name(label)
                    .width(0.6)
                    .fill(Self::bar_color(i))
            })
            .collect();

        Plot::new(format!("bar_{}", data.title))
            .height(320.0)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .include_y(0.0)
            .y_axis_label(data.value_label.clone())
            // One tick per bar
            .x_grid_spacer(move |_input| {
                (0..count)
                    .map(|i| GridMark {
                        value: i as f64,
                        step_size: 1.0,
                    })
                    .collect()
            })
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if idx < 0.0 || (mark.value - idx).abs() > 1e-6 {
                    return String::new();
                }
                x_labels.get(idx as usize).cloned().unwrap_or_default()
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).name(data.value_label.as_str()));
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::Cell;

    #[test]
    fn chart_data_skips_null_values() {
        let result = QueryResult {
            title: "Drug stops".into(),
            columns: vec!["country_name".into(), "drug_stop_rate".into()],
            rows: vec![
                vec![Cell::Text("India".into()), Cell::Real(12.5)],
                vec![Cell::Text("Canada".into()), Cell::Null],
                vec![Cell::Text("USA".into()), Cell::Integer(3)],
            ],
        };
        let spec = ChartSpec {
            label_column: "country_name",
            value_column: "drug_stop_rate",
            value_label: "Drug-related stops (%)",
        };
        let data = ChartData::from_result(&result, &spec).unwrap();
        assert_eq!(data.labels, vec!["India", "USA"]);
        assert_eq!(data.values, vec![12.5, 3.0]);
    }

    #[test]
    fn unknown_column_gives_no_chart() {
        let result = QueryResult {
            title: "x".into(),
            columns: vec!["a".into()],
            rows: Vec::new(),
        };
        let spec = ChartSpec {
            label_column: "a",
            value_column: "b",
            value_label: "",
        };
        assert!(ChartData::from_result(&result, &spec).is_none());
    }
}
