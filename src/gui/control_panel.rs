//! Control Panel Widget
//! Left side panel with the query catalog, parameters and actions.

use crate::queries::{AnalyticsQuery, QueryParams};
use egui::{Color32, ComboBox, RichText};

/// File formats a result can be exported to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Png,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Png => "png",
        }
    }

    pub fn filter_name(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV Files",
            ExportFormat::Json => "JSON Files",
            ExportFormat::Png => "PNG Images",
        }
    }
}

/// Left side control panel.
pub struct ControlPanel {
    pub selected_query: AnalyticsQuery,
    pub params: QueryParams,
    pub replace_on_import: bool,
    pub row_count: usize,
    pub database_label: String,
    pub has_result: bool,
    pub has_chart: bool,
    pub status: String,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            selected_query: AnalyticsQuery::ArrestRateByTimeOfDay,
            params: QueryParams::default(),
            replace_on_import: true,
            row_count: 0,
            database_label: String::new(),
            has_result: false,
            has_chart: false,
            status: "Ready".to_string(),
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🚓 SecureCheck")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Police Post Digital Ledger")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.label(RichText::new(&self.database_label).size(12.0));
                ui.label(
                    RichText::new(format!("{} stops logged", self.row_count))
                        .size(11.0)
                        .color(Color32::GRAY),
                );
                ui.add_space(4.0);
                ui.horizontal(|ui| {
                    ui.checkbox(&mut self.replace_on_import, "Replace table");
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Import CSV").clicked() {
                            action = ControlPanelAction::ImportCsv;
                        }
                    });
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Query Section =====
        ui.label(RichText::new("🔎 Analytics Query").size(14.0).strong());
        ui.add_space(8.0);

        ComboBox::from_id_salt("analytics_query")
            .width(ui.available_width())
            .selected_text(self.selected_query.title())
            .show_ui(ui, |ui| {
                for query in AnalyticsQuery::ALL {
                    ui.selectable_value(&mut self.selected_query, query, query.title());
                }
            });

        ui.add_space(5.0);

        let label_width = 110.0;
        if self.selected_query.uses_limit() {
            ui.horizontal(|ui| {
                ui.add_sized([label_width, 20.0], egui::Label::new("Top N:"));
                ui.add(egui::DragValue::new(&mut self.params.limit).range(1..=100));
            });
        }
        if self.selected_query.uses_min_stops() {
            ui.horizontal(|ui| {
                ui.add_sized([label_width, 20.0], egui::Label::new("Min. stops:"));
                ui.add(egui::DragValue::new(&mut self.params.min_stops).range(1..=10_000));
            });
        }

        ui.add_space(10.0);

        ui.vertical_centered(|ui| {
            let button = egui::Button::new(RichText::new("▶ Run Analytics Query").size(16.0))
                .min_size(egui::vec2(200.0, 35.0));
            if ui.add(button).clicked() {
                action = ControlPanelAction::RunQuery;
            }

            ui.add_space(6.0);

            let chi_button = egui::Button::new(RichText::new("χ² Violation vs Arrest").size(14.0))
                .min_size(egui::vec2(200.0, 30.0));
            if ui.add(chi_button).clicked() {
                action = ControlPanelAction::RunChiSquare;
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export Section =====
        ui.label(RichText::new("💾 Export Result").size(14.0).strong());
        ui.add_space(5.0);

        ui.horizontal(|ui| {
            ui.add_enabled_ui(self.has_result, |ui| {
                if ui.button("CSV").clicked() {
                    action = ControlPanelAction::Export(ExportFormat::Csv);
                }
                if ui.button("JSON").clicked() {
                    action = ControlPanelAction::Export(ExportFormat::Json);
                }
            });
            ui.add_enabled_ui(self.has_chart, |ui| {
                if ui.button("PNG chart").clicked() {
                    action = ControlPanelAction::Export(ExportFormat::Png);
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        ui.label(RichText::new("📊 Status").size(14.0).strong());
        ui.add_space(5.0);

        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("Complete") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    ImportCsv,
    RunQuery,
    RunChiSquare,
    Export(ExportFormat),
}
