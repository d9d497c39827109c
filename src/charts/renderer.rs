//! Static Chart Renderer
//! Writes a bar chart PNG for a query result with plotters.
//!
//! Layout:
//! 1. Title centered at the top
//! 2. Bars in palette order with the value axis on the left
//! 3. One category label under each bar

use crate::charts::{ChartData, ChartPlotter};
use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("No values to draw")]
    Empty,
    #[error("Drawing failed: {0}")]
    Draw(String),
}

fn draw_err(e: impl std::fmt::Display) -> RenderError {
    RenderError::Draw(e.to_string())
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    pub const DEFAULT_SIZE: (u32, u32) = (1200, 800);

    pub fn render_png(
        data: &ChartData,
        path: &Path,
        (width, height): (u32, u32),
    ) -> Result<(), RenderError> {
        if data.is_empty() {
            return Err(RenderError::Empty);
        }

        let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let count = data.values.len();
        let max = data.values.iter().copied().fold(0.0_f64, f64::max);
        let y_top = if max > 0.0 { max * 1.15 } else { 1.0 };

        let mut chart = ChartBuilder::on(&root)
            .caption(&data.title, ("sans-serif", 28))
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(70)
            .build_cartesian_2d((0..count).into_segmented(), 0.0..y_top)
            .map_err(draw_err)?;

        let labels = &data.labels;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(count + 1)
            .x_label_formatter(&|v| match v {
                SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
                _ => String::new(),
            })
            .y_desc(data.value_label.as_str())
            .label_style(("sans-serif", 16))
            .draw()
            .map_err(draw_err)?;

        chart
            .draw_series(data.values.iter().enumerate().map(|(i, &value)| {
                let c = ChartPlotter::bar_color(i);
                let mut bar = Rectangle::new(
                    [
                        (SegmentValue::Exact(i), 0.0),
                        (SegmentValue::Exact(i + 1), value),
                    ],
                    RGBColor(c.r(), c.g(), c.b()).filled(),
                );
                bar.set_margin(0, 0, 12, 12);
                bar
            }))
            .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_chart_is_rejected() {
        let data = ChartData {
            title: "Empty".into(),
            labels: Vec::new(),
            values: Vec::new(),
            value_label: "Rate".into(),
        };
        let dir = tempfile::TempDir::new().unwrap();
        let err = StaticChartRenderer::render_png(
            &data,
            &dir.path().join("empty.png"),
            StaticChartRenderer::DEFAULT_SIZE,
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::Empty));
    }
}
