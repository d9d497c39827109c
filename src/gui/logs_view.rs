//! Latest Logs Widget
//! Most recent stops with a country / vehicle number search box.

use crate::gui::draw_result_table;
use crate::queries::QueryResult;
use egui::RichText;

#[derive(Default)]
pub struct LogsView {
    pub search_term: String,
    pub logs: Option<QueryResult>,
}

impl LogsView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Term to pass to the search query, if any.
    pub fn term(&self) -> Option<&str> {
        let term = self.search_term.trim();
        (!term.is_empty()).then_some(term)
    }

    /// Draw the view. Returns true when the search term changed.
    pub fn show(&mut self, ui: &mut egui::Ui) -> bool {
        let changed = ui
            .horizontal(|ui| {
                ui.label("Search Logs by Country Name or Vehicle Number:");
                ui.add(
                    egui::TextEdit::singleline(&mut self.search_term)
                        .desired_width(240.0)
                        .hint_text("e.g. India"),
                )
                .changed()
            })
            .inner;

        ui.add_space(6.0);
        match &self.logs {
            Some(logs) if !logs.is_empty() => draw_result_table(ui, "latest_logs", logs),
            Some(_) => {
                ui.label(RichText::new("No matching stops.").italics());
            }
            None => {}
        }

        changed
    }
}
