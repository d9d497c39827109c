//! Results View Widget
//! Central panel area showing the last query result as a table and chart.

use crate::charts::{ChartData, ChartPlotter};
use crate::queries::QueryResult;
use crate::stats::{ChiSquareResult, ContingencyTable};
use egui::{Color32, RichText, ScrollArea};

/// Last analytics result, its chart, and the last chi-square run.
#[derive(Default)]
pub struct ResultsView {
    pub result: Option<QueryResult>,
    pub chart: Option<ChartData>,
    pub chi_square: Option<(ContingencyTable, ChiSquareResult)>,
}

impl ResultsView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_result(&mut self, result: QueryResult, chart: Option<ChartData>) {
        self.chart = chart.filter(|c| !c.is_empty());
        self.result = Some(result);
    }

    pub fn show(&self, ui: &mut egui::Ui) {
        match &self.result {
            None => {
                ui.label(
                    RichText::new("Select a query and press Run")
                        .size(14.0)
                        .color(Color32::GRAY),
                );
            }
            Some(result) if result.is_empty() => {
                ui.label(RichText::new(&result.title).size(18.0).strong());
                ui.label("No rows returned.");
            }
            Some(result) => {
                ui.label(
                    RichText::new(format!("Results for: {}", result.title))
                        .size(18.0)
                        .strong(),
                );
                ui.add_space(8.0);
                draw_result_table(ui, "analytics_result", result);

                if let Some(chart) = &self.chart {
                    ui.add_space(12.0);
                    ChartPlotter::draw_bar_chart(ui, chart);
                }
            }
        }

        if let Some((table, test)) = &self.chi_square {
            ui.add_space(15.0);
            ui.separator();
            Self::draw_chi_square(ui, table, test);
        }
    }

    fn draw_chi_square(ui: &mut egui::Ui, table: &ContingencyTable, test: &ChiSquareResult) {
        let color = if test.is_significant {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::from_rgb(40, 167, 69)
        };
        let verdict = if test.is_significant {
            "⚠ Dependent (p ≤ 0.05)"
        } else {
            "✓ No evidence of dependence"
        };

        ui.label(RichText::new("Chi-Square: Violation vs Arrest").size(16.0).strong());
        ui.label(RichText::new(verdict).color(color));
        ui.label(format!(
            "χ² = {:.3}   dof = {}   p = {:.4}   Cramér's V = {:.3}   n = {}",
            test.statistic,
            test.degrees_of_freedom,
            test.p_value,
            test.cramers_v,
            table.total()
        ));
    }
}

/// Striped grid with a header row.
pub fn draw_result_table(ui: &mut egui::Ui, id: &str, result: &QueryResult) {
    egui::Frame::none()
        .fill(ui.visuals().widgets.noninteractive.bg_fill)
        .rounding(5.0)
        .inner_margin(8.0)
        .show(ui, |ui| {
            ScrollArea::horizontal().id_salt(id).show(ui, |ui| {
                egui::Grid::new(ui.make_persistent_id(id))
                    .striped(true)
                    .min_col_width(60.0)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        for column in &result.columns {
                            ui.label(RichText::new(column).strong().size(12.0));
                        }
                        ui.end_row();

                        for row in &result.rows {
                            for cell in row {
                                ui.label(RichText::new(cell.to_string()).size(12.0));
                            }
                            ui.end_row();
                        }
                    });
            });
        });
}
