//! GUI module - dashboard window and its widgets

mod app;
mod control_panel;
mod log_form;
mod logs_view;
mod results_view;

pub use app::DashboardApp;
pub use control_panel::{ControlPanel, ControlPanelAction, ExportFormat};
pub use log_form::{FormError, LogForm};
pub use logs_view::LogsView;
pub use results_view::{draw_result_table, ResultsView};
