//! New Police Log Form
//! Manual entry of a single stop, appended to the ledger.

use crate::data::{
    parse_stop_date, parse_stop_time, standardize_violation, title_case, CleanStop, Gender,
    StopDuration,
};
use chrono::Local;
use egui::{ComboBox, RichText};
use thiserror::Error;

const VIOLATIONS: [&str; 5] = ["Speeding", "DUI", "Seatbelt", "Signal", "Other"];
const OUTCOMES: [&str; 4] = ["Citation", "Warning", "Arrest", "None"];

#[derive(Error, Debug, PartialEq)]
pub enum FormError {
    #[error("Stop date '{0}' is not a valid date (YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("Stop time '{0}' is not a valid time (HH:MM[:SS])")]
    InvalidTime(String),
    #[error("Country name is required")]
    MissingCountry,
}

/// Form state; strings are validated only on submit.
#[derive(Debug, Clone)]
pub struct LogForm {
    pub stop_date: String,
    pub stop_time: String,
    pub country_name: String,
    pub vehicle_number: String,
    pub driver_gender: Gender,
    pub driver_age: u32,
    pub violation: String,
    pub stop_duration: StopDuration,
    pub search_conducted: bool,
    pub drugs_related_stop: bool,
    pub is_arrested: bool,
    pub stop_outcome: String,
}

impl Default for LogForm {
    fn default() -> Self {
        let now = Local::now().naive_local();
        Self {
            stop_date: now.format("%Y-%m-%d").to_string(),
            stop_time: now.format("%H:%M:%S").to_string(),
            country_name: "India".to_string(),
            vehicle_number: String::new(),
            driver_gender: Gender::Male,
            driver_age: 30,
            violation: VIOLATIONS[0].to_string(),
            stop_duration: StopDuration::UnderFive,
            search_conducted: false,
            drugs_related_stop: false,
            is_arrested: false,
            stop_outcome: OUTCOMES[0].to_string(),
        }
    }
}

impl LogForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and standardize the form the same way CSV rows are.
    pub fn to_stop(&self) -> Result<CleanStop, FormError> {
        let stop_date = parse_stop_date(&self.stop_date)
            .ok_or_else(|| FormError::InvalidDate(self.stop_date.clone()))?;
        let (stop_time, _) = parse_stop_time(&self.stop_time)
            .ok_or_else(|| FormError::InvalidTime(self.stop_time.clone()))?;
        let country_name = title_case(&self.country_name).ok_or(FormError::MissingCountry)?;

        let vehicle = self.vehicle_number.trim();
        let vehicle_number = if vehicle.is_empty() {
            "Unknown".to_string()
        } else {
            vehicle.to_ascii_uppercase()
        };
        let violation =
            standardize_violation(&self.violation).unwrap_or_else(|| "Other".to_string());
        let search_type = if self.search_conducted {
            "Vehicle Search"
        } else {
            "None Conducted"
        };

        Ok(CleanStop {
            stop_date,
            stop_time,
            country_name,
            driver_gender: self.driver_gender,
            driver_age: self.driver_age,
            driver_race: "Unknown".to_string(),
            violation_raw: self.violation.trim().to_string(),
            violation,
            search_conducted: self.search_conducted,
            search_type: search_type.to_string(),
            stop_outcome: self.stop_outcome.clone(),
            is_arrested: self.is_arrested,
            stop_duration: self.stop_duration,
            drugs_related_stop: self.drugs_related_stop,
            vehicle_number,
        })
    }

    /// Draw the form. Returns true when submitted.
    pub fn show(&mut self, ui: &mut egui::Ui) -> bool {
        let mut submitted = false;

        ui.label("Enter details for a new vehicle stop.");
        ui.add_space(5.0);

        ui.columns(3, |cols| {
            let ui = &mut cols[0];
            ui.label("Stop Date");
            ui.text_edit_singleline(&mut self.stop_date);
            ui.label("Stop Time");
            ui.text_edit_singleline(&mut self.stop_time);
            ui.label("Country Name");
            ui.text_edit_singleline(&mut self.country_name);
            ui.label("Vehicle Number");
            ui.add(
                egui::TextEdit::singleline(&mut self.vehicle_number).hint_text("e.g. RJ83PZ4441"),
            );

            let ui = &mut cols[1];
            ui.label("Driver Gender");
            ComboBox::from_id_salt("form_gender")
                .selected_text(self.driver_gender.as_str())
                .show_ui(ui, |ui| {
                    for gender in Gender::ALL {
                        ui.selectable_value(&mut self.driver_gender, gender, gender.as_str());
                    }
                });
            ui.label("Driver Age");
            ui.add(egui::DragValue::new(&mut self.driver_age).range(16..=100));
            ui.label("Violation Type");
            ComboBox::from_id_salt("form_violation")
                .selected_text(self.violation.as_str())
                .show_ui(ui, |ui| {
                    for violation in VIOLATIONS {
                        ui.selectable_value(&mut self.violation, violation.to_string(), violation);
                    }
                });
            ui.label("Stop Duration");
            ComboBox::from_id_salt("form_duration")
                .selected_text(self.stop_duration.as_str())
                .show_ui(ui, |ui| {
                    for duration in StopDuration::ALL {
                        ui.selectable_value(&mut self.stop_duration, duration, duration.as_str());
                    }
                });

            let ui = &mut cols[2];
            ui.checkbox(&mut self.search_conducted, "Search Conducted?");
            ui.checkbox(&mut self.drugs_related_stop, "Drug-Related Stop?");
            ui.checkbox(&mut self.is_arrested, "Resulted in Arrest?");
            ui.label("Stop Outcome");
            ComboBox::from_id_salt("form_outcome")
                .selected_text(self.stop_outcome.as_str())
                .show_ui(ui, |ui| {
                    for outcome in OUTCOMES {
                        ui.selectable_value(&mut self.stop_outcome, outcome.to_string(), outcome);
                    }
                });
        });

        ui.add_space(8.0);
        if ui
            .button(RichText::new("✚ Submit Log").size(14.0))
            .clicked()
        {
            submitted = true;
        }

        submitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn filled() -> LogForm {
        LogForm {
            stop_date: "2024-06-01".into(),
            stop_time: "22:30".into(),
            country_name: "  canada ".into(),
            vehicle_number: " ka01ab1234 ".into(),
            search_conducted: true,
            ..LogForm::default()
        }
    }

    #[test]
    fn form_builds_standardized_stop() {
        let stop = filled().to_stop().unwrap();
        assert_eq!(stop.stop_date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(stop.stop_time, NaiveTime::from_hms_opt(22, 30, 0).unwrap());
        assert_eq!(stop.country_name, "Canada");
        assert_eq!(stop.vehicle_number, "KA01AB1234");
        assert_eq!(stop.search_type, "Vehicle Search");
    }

    #[test]
    fn blank_vehicle_becomes_unknown() {
        let form = LogForm {
            vehicle_number: "   ".into(),
            ..filled()
        };
        assert_eq!(form.to_stop().unwrap().vehicle_number, "Unknown");
    }

    #[test]
    fn invalid_fields_are_reported() {
        let bad_time = LogForm {
            stop_time: "25:99".into(),
            ..filled()
        };
        assert_eq!(
            bad_time.to_stop().unwrap_err(),
            FormError::InvalidTime("25:99".into())
        );

        let no_country = LogForm {
            country_name: " ".into(),
            ..filled()
        };
        assert_eq!(no_country.to_stop().unwrap_err(), FormError::MissingCountry);
    }
}
