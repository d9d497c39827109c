//! SecureCheck Dashboard Application
//! Main window: control panel on the left, results, log form and latest
//! logs in the center. Every interaction runs one query synchronously.

use crate::charts::{ChartData, StaticChartRenderer};
use crate::config::AppConfig;
use crate::data::FeatureDeriver;
use crate::db::Database;
use crate::gui::{ControlPanel, ControlPanelAction, ExportFormat, LogForm, LogsView, ResultsView};
use crate::pipeline;
use crate::queries::{search_logs, LATEST_LOGS_LIMIT};
use crate::stats::{chi_square_independence, contingency_table, CategoricalColumn};
use egui::{CollapsingHeader, RichText, SidePanel};
use tracing::warn;

/// Main application window.
pub struct DashboardApp {
    db: Database,
    config: AppConfig,
    control_panel: ControlPanel,
    results_view: ResultsView,
    log_form: LogForm,
    logs_view: LogsView,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, db: Database, config: AppConfig) -> Self {
        let mut control_panel = ControlPanel::new();
        control_panel.database_label = db
            .path()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "in-memory".to_string());

        let mut app = Self {
            db,
            config,
            control_panel,
            results_view: ResultsView::new(),
            log_form: LogForm::new(),
            logs_view: LogsView::new(),
        };
        app.refresh_row_count();
        app.refresh_logs();
        app
    }

    fn report_error(&mut self, context: &str, error: impl std::fmt::Display) {
        warn!(%error, "{}", context);
        self.control_panel
            .set_status(&format!("Error: {}: {}", context, error));
    }

    fn refresh_row_count(&mut self) {
        match self.db.count_rows() {
            Ok(count) => self.control_panel.row_count = count,
            Err(e) => self.report_error("Counting stops failed", e),
        }
    }

    fn refresh_logs(&mut self) {
        match search_logs(&self.db, self.logs_view.term(), LATEST_LOGS_LIMIT) {
            Ok(logs) => self.logs_view.logs = Some(logs),
            Err(e) => self.report_error("Log search failed", e),
        }
    }

    fn handle_run_query(&mut self) {
        let query = self.control_panel.selected_query;
        match query.run(&self.db, &self.control_panel.params) {
            Ok(result) => {
                let chart = query
                    .chart()
                    .and_then(|spec| ChartData::from_result(&result, &spec));
                let rows = result.rows.len();
                self.control_panel.has_chart = chart.as_ref().is_some_and(|c| !c.is_empty());
                self.control_panel.has_result = true;
                self.results_view.set_result(result, chart);
                self.control_panel
                    .set_status(&format!("Complete! {} rows", rows));
            }
            Err(e) => self.report_error("Query failed", e),
        }
    }

    fn handle_chi_square(&mut self) {
        let outcome = contingency_table(
            &self.db,
            CategoricalColumn::Violation,
            CategoricalColumn::IsArrested,
        )
        .and_then(|table| chi_square_independence(&table).map(|test| (table, test)));

        match outcome {
            Ok((table, test)) => {
                self.control_panel.set_status(&format!(
                    "Complete! χ² = {:.3}, p = {:.4}",
                    test.statistic, test.p_value
                ));
                self.results_view.chi_square = Some((table, test));
            }
            Err(e) => self.report_error("Chi-square test failed", e),
        }
    }

    fn handle_import_csv(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        else {
            return;
        };

        let replace = self.control_panel.replace_on_import;
        match pipeline::ingest(&path, &mut self.db, &self.config, replace) {
            Ok(summary) => {
                self.control_panel.set_status(&format!(
                    "Complete! Loaded {} of {} rows ({} dropped)",
                    summary.rows_persisted,
                    summary.rows_read,
                    summary.dropped.len()
                ));
                self.results_view = ResultsView::new();
                self.control_panel.has_result = false;
                self.control_panel.has_chart = false;
            }
            Err(e) => self.report_error("Import failed", format!("{:#}", e)),
        }
        self.refresh_row_count();
        self.refresh_logs();
    }

    fn handle_submit_log(&mut self) {
        let stop = match self.log_form.to_stop() {
            Ok(stop) => stop,
            Err(e) => {
                self.report_error("Invalid log entry", e);
                return;
            }
        };
        let record = FeatureDeriver::new(self.config.features).derive(stop);
        match self.db.insert_record(&record) {
            Ok(id) => {
                self.control_panel
                    .set_status(&format!("Complete! Stop #{} logged", id));
                self.refresh_row_count();
                self.refresh_logs();
            }
            Err(e) => self.report_error("Logging stop failed", e),
        }
    }

    fn handle_export(&mut self, format: ExportFormat) {
        let Some(result) = &self.results_view.result else {
            self.control_panel.set_status("Nothing to export");
            return;
        };

        let file_name = format!("{}.{}", result.title.replace([' ', ':', '/'], "_"), format.extension());
        let Some(path) = rfd::FileDialog::new()
            .add_filter(format.filter_name(), &[format.extension()])
            .set_file_name(file_name)
            .save_file()
        else {
            return;
        };

        let outcome = match format {
            ExportFormat::Csv => result.write_csv(&path).map_err(|e| e.to_string()),
            ExportFormat::Json => result.write_json(&path).map_err(|e| e.to_string()),
            ExportFormat::Png => match &self.results_view.chart {
                Some(chart) => StaticChartRenderer::render_png(
                    chart,
                    &path,
                    StaticChartRenderer::DEFAULT_SIZE,
                )
                .map_err(|e| e.to_string()),
                None => Err("this query has no chart".to_string()),
            },
        };

        match outcome {
            Ok(()) => {
                self.control_panel
                    .set_status(&format!("Complete! Exported {}", path.display()));
                if format == ExportFormat::Png {
                    if let Err(e) = open::that(&path) {
                        warn!(error = %e, "could not open exported chart");
                    }
                }
            }
            Err(e) => self.report_error("Export failed", e),
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::ImportCsv => self.handle_import_csv(),
                        ControlPanelAction::RunQuery => self.handle_run_query(),
                        ControlPanelAction::RunChiSquare => self.handle_chi_square(),
                        ControlPanelAction::Export(format) => self.handle_export(format),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - results, new log form, latest logs
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.heading("Advanced Insights");
                    ui.add_space(6.0);
                    self.results_view.show(ui);

                    ui.add_space(15.0);
                    ui.separator();

                    let mut submitted = false;
                    CollapsingHeader::new(RichText::new("Add New Police Log").heading())
                        .default_open(false)
                        .show(ui, |ui| {
                            submitted = self.log_form.show(ui);
                        });
                    if submitted {
                        self.handle_submit_log();
                    }

                    ui.add_space(15.0);
                    ui.separator();
                    ui.heading("Latest Logs and Quick Search");
                    ui.add_space(6.0);
                    if self.logs_view.show(ui) {
                        self.refresh_logs();
                    }
                });
        });
    }
}
