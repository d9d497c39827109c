//! Data Cleaner Module
//! Turns the raw text table into typed stop rows: null repair, spelling
//! standardization and date/time parsing.

use crate::config::TimestampPolicy;
use crate::data::record::{CleanStop, Gender, StopDuration};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use polars::prelude::*;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum CleanerError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Required column '{0}' is missing or empty")]
    MissingColumn(&'static str),
}

/// Why a row did not survive cleaning.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowIssue {
    #[error("stop_time is missing")]
    MissingTime,
    #[error("stop_time '{0}' is not a valid time")]
    InvalidTime(String),
    #[error("stop_date is missing")]
    MissingDate,
    #[error("stop_date '{0}' is not a valid date")]
    InvalidDate(String),
    #[error("driver_age is unusable and no valid age exists to impute from")]
    NoValidAge,
}

/// A row skipped during cleaning. `row` is the 0-based data row index.
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedRow {
    pub row: usize,
    pub reason: RowIssue,
}

/// Output of a cleaning pass.
#[derive(Debug, Default)]
pub struct CleanReport {
    pub records: Vec<CleanStop>,
    pub dropped: Vec<DroppedRow>,
    /// Number of individual cells filled by imputation
    pub imputed_cells: usize,
}

const REQUIRED_COLUMNS: [&str; 2] = ["stop_time", "is_arrested"];
const NULL_MARKERS: [&str; 5] = ["nan", "null", "none", "na", "n/a"];

const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%d-%m-%Y"];

/// Parsing state of a single date or time cell.
#[derive(Debug, Clone)]
enum Field<T> {
    Parsed(T),
    Missing,
    Invalid(String),
}

/// First pass over a row: everything parsed, nothing imputed yet.
#[derive(Debug)]
struct ParsedRow {
    date: Field<NaiveDate>,
    time: Field<NaiveTime>,
    country: Option<String>,
    gender: Option<Gender>,
    age: Option<u32>,
    race: Option<String>,
    violation_raw: Option<String>,
    violation: Option<String>,
    search_conducted: Option<bool>,
    search_type: Option<String>,
    stop_outcome: Option<String>,
    is_arrested: Option<bool>,
    stop_duration: Option<StopDuration>,
    drugs_related: Option<bool>,
    vehicle_number: Option<String>,
}

/// Column-level fill values computed from the parsed rows.
#[derive(Debug)]
struct Imputation {
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
    country: String,
    gender: Gender,
    age: Option<u32>,
    violation: String,
    search_conducted: bool,
    stop_outcome: String,
    is_arrested: bool,
    stop_duration: StopDuration,
    drugs_related: bool,
}

/// Handles cleaning of raw traffic-stop tables.
pub struct Cleaner {
    policy: TimestampPolicy,
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::new(TimestampPolicy::default())
    }
}

impl Cleaner {
    pub fn new(policy: TimestampPolicy) -> Self {
        Self { policy }
    }

    /// Remove columns that contain only missing values.
    pub fn drop_empty_columns(df: &DataFrame) -> Result<DataFrame, CleanerError> {
        let height = df.height();
        let keep: Vec<PlSmallStr> = df
            .get_columns()
            .iter()
            .filter(|col| height == 0 || col.null_count() < col.len())
            .map(|col| col.name().clone())
            .collect();

        let dropped = df.width() - keep.len();
        if dropped > 0 {
            debug!(dropped, "removed all-null columns");
        }
        Ok(df.select(keep)?)
    }

    /// Clean a raw table into typed rows.
    pub fn clean(&self, raw: &DataFrame) -> Result<CleanReport, CleanerError> {
        let df = Self::drop_empty_columns(raw)?;
        for required in REQUIRED_COLUMNS {
            if df.column(required).is_err() {
                return Err(CleanerError::MissingColumn(required));
            }
        }
        if df.column("violation").is_err() && df.column("violation_raw").is_err() {
            return Err(CleanerError::MissingColumn("violation"));
        }

        let parsed = Self::parse_rows(&df)?;
        let fill = Self::imputation(&parsed);

        let mut report = CleanReport::default();
        for (row, parsed_row) in parsed.into_iter().enumerate() {
            match self.finish_row(parsed_row, &fill, &mut report.imputed_cells) {
                Ok(stop) => report.records.push(stop),
                Err(reason) => {
                    debug!(row, %reason, "dropping row");
                    report.dropped.push(DroppedRow { row, reason });
                }
            }
        }

        if !report.dropped.is_empty() {
            warn!(
                dropped = report.dropped.len(),
                "rows skipped during cleaning"
            );
        }
        info!(
            kept = report.records.len(),
            imputed_cells = report.imputed_cells,
            "data cleaning complete"
        );
        Ok(report)
    }

    fn parse_rows(df: &DataFrame) -> Result<Vec<ParsedRow>, CleanerError> {
        let height = df.height();
        let column = |name: &str| text_column(df, name, height);

        let dates = column("stop_date")?;
        let times = column("stop_time")?;
        let countries = column("country_name")?;
        let genders = column("driver_gender")?;
        let ages = if df.column("driver_age").is_ok() {
            column("driver_age")?
        } else {
            column("driver_age_raw")?
        };
        let races = column("driver_race")?;
        let violations_raw = column("violation_raw")?;
        let violations = column("violation")?;
        let searches = column("search_conducted")?;
        let search_types = column("search_type")?;
        let outcomes = column("stop_outcome")?;
        let arrests = column("is_arrested")?;
        let durations = column("stop_duration")?;
        let drugs = column("drugs_related_stop")?;
        let vehicles = column("vehicle_number")?;

        let mut rows = Vec::with_capacity(height);
        for i in 0..height {
            let (time, time_date) = match present(&times[i]) {
                None => (Field::Missing, None),
                Some(raw) => match parse_stop_time(raw) {
                    Some((t, d)) => (Field::Parsed(t), d),
                    None => (Field::Invalid(raw.to_string()), None),
                },
            };

            let date = match present(&dates[i]) {
                Some(raw) => match parse_stop_date(raw) {
                    Some(d) => Field::Parsed(d),
                    None => match time_date {
                        Some(d) => Field::Parsed(d),
                        None => Field::Invalid(raw.to_string()),
                    },
                },
                None => match time_date {
                    Some(d) => Field::Parsed(d),
                    None => Field::Missing,
                },
            };

            let violation_raw = present(&violations_raw[i]).map(|s| s.trim().to_string());
            let violation = present(&violations[i])
                .or(violation_raw.as_deref())
                .and_then(standardize_violation);

            rows.push(ParsedRow {
                date,
                time,
                country: present(&countries[i]).and_then(title_case),
                gender: present(&genders[i]).and_then(Gender::parse),
                age: present(&ages[i]).and_then(parse_age),
                race: present(&races[i]).and_then(title_case),
                violation_raw,
                violation,
                search_conducted: present(&searches[i]).and_then(parse_bool),
                search_type: present(&search_types[i]).map(|s| s.trim().to_string()),
                stop_outcome: present(&outcomes[i]).and_then(title_case),
                is_arrested: present(&arrests[i]).and_then(parse_bool),
                stop_duration: present(&durations[i]).and_then(StopDuration::parse),
                drugs_related: present(&drugs[i]).and_then(parse_bool),
                vehicle_number: present(&vehicles[i]).map(|s| s.trim().to_ascii_uppercase()),
            });
        }
        Ok(rows)
    }

    fn imputation(rows: &[ParsedRow]) -> Imputation {
        let valid_ages: Vec<u32> = rows.iter().filter_map(|r| r.age).collect();
        let age = if valid_ages.is_empty() {
            None
        } else {
            let mean = valid_ages.iter().map(|&a| a as f64).sum::<f64>() / valid_ages.len() as f64;
            Some(mean.round() as u32)
        };

        Imputation {
            date: mode(rows.iter().filter_map(|r| match r.date {
                Field::Parsed(d) => Some(d),
                _ => None,
            })),
            time: mode(rows.iter().filter_map(|r| match r.time {
                Field::Parsed(t) => Some(t),
                _ => None,
            })),
            country: mode(rows.iter().filter_map(|r| r.country.clone()))
                .unwrap_or_else(|| "Unknown".to_string()),
            gender: mode(rows.iter().filter_map(|r| r.gender)).unwrap_or(Gender::Other),
            age,
            violation: mode(rows.iter().filter_map(|r| r.violation.clone()))
                .unwrap_or_else(|| "Other".to_string()),
            search_conducted: mode(rows.iter().filter_map(|r| r.search_conducted)).unwrap_or(false),
            stop_outcome: mode(rows.iter().filter_map(|r| r.stop_outcome.clone()))
                .unwrap_or_else(|| "Unknown".to_string()),
            is_arrested: mode(rows.iter().filter_map(|r| r.is_arrested)).unwrap_or(false),
            stop_duration: mode(rows.iter().filter_map(|r| r.stop_duration))
                .unwrap_or(StopDuration::UnderFive),
            drugs_related: mode(rows.iter().filter_map(|r| r.drugs_related)).unwrap_or(false),
        }
    }

    fn finish_row(
        &self,
        row: ParsedRow,
        fill: &Imputation,
        imputed: &mut usize,
    ) -> Result<CleanStop, RowIssue> {
        let stop_time = match row.time {
            Field::Parsed(t) => t,
            Field::Missing => self.impute_timestamp(fill.time, RowIssue::MissingTime, imputed)?,
            Field::Invalid(raw) => {
                self.impute_timestamp(fill.time, RowIssue::InvalidTime(raw), imputed)?
            }
        };
        let stop_date = match row.date {
            Field::Parsed(d) => d,
            Field::Missing => self.impute_timestamp(fill.date, RowIssue::MissingDate, imputed)?,
            Field::Invalid(raw) => {
                self.impute_timestamp(fill.date, RowIssue::InvalidDate(raw), imputed)?
            }
        };
        let driver_age = match row.age {
            Some(age) => age,
            None => {
                *imputed += 1;
                fill.age.ok_or(RowIssue::NoValidAge)?
            }
        };

        let mut or_fill = |value: Option<String>, default: &str| {
            value.unwrap_or_else(|| {
                *imputed += 1;
                default.to_string()
            })
        };
        let country_name = or_fill(row.country, &fill.country);
        let violation = or_fill(row.violation, &fill.violation);
        let violation_raw = row.violation_raw.unwrap_or_else(|| violation.clone());
        let stop_outcome = or_fill(row.stop_outcome, &fill.stop_outcome);
        let search_type = or_fill(row.search_type, "None Conducted");
        let vehicle_number = or_fill(row.vehicle_number, "Unknown");
        let driver_race = or_fill(row.race, "Unknown");

        let mut or_mode = |value: Option<bool>, mode: bool| {
            value.unwrap_or_else(|| {
                *imputed += 1;
                mode
            })
        };
        let search_conducted = or_mode(row.search_conducted, fill.search_conducted);
        let is_arrested = or_mode(row.is_arrested, fill.is_arrested);
        let drugs_related_stop = or_mode(row.drugs_related, fill.drugs_related);

        let driver_gender = row.gender.unwrap_or_else(|| {
            *imputed += 1;
            fill.gender
        });
        let stop_duration = row.stop_duration.unwrap_or_else(|| {
            *imputed += 1;
            fill.stop_duration
        });

        Ok(CleanStop {
            stop_date,
            stop_time,
            country_name,
            driver_gender,
            driver_age,
            driver_race,
            violation_raw,
            violation,
            search_conducted,
            search_type,
            stop_outcome,
            is_arrested,
            stop_duration,
            drugs_related_stop,
            vehicle_number,
        })
    }

    fn impute_timestamp<T: Copy>(
        &self,
        fill: Option<T>,
        issue: RowIssue,
        imputed: &mut usize,
    ) -> Result<T, RowIssue> {
        match (self.policy, fill) {
            (TimestampPolicy::Impute, Some(value)) => {
                *imputed += 1;
                Ok(value)
            }
            _ => Err(issue),
        }
    }
}

/// Read a column as owned optional strings, or all-null if absent.
fn text_column(
    df: &DataFrame,
    name: &str,
    height: usize,
) -> Result<Vec<Option<String>>, CleanerError> {
    let Ok(column) = df.column(name) else {
        return Ok(vec![None; height]);
    };
    let ca = column.as_materialized_series().str()?;
    Ok(ca.into_iter().map(|v| v.map(str::to_string)).collect())
}

/// Blank cells and textual null markers count as missing.
fn present(cell: &Option<String>) -> Option<&str> {
    let value = cell.as_deref()?.trim();
    if value.is_empty() || NULL_MARKERS.contains(&value.to_ascii_lowercase().as_str()) {
        None
    } else {
        Some(value)
    }
}

/// Most frequent value; ties go to the smallest.
fn mode<T: Ord>(values: impl Iterator<Item = T>) -> Option<T> {
    let mut counts: BTreeMap<T, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }
    let mut best: Option<(T, usize)> = None;
    for (value, count) in counts {
        if best.as_ref().map_or(true, |(_, c)| count > *c) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

/// Parse a stop time. Full datetimes also yield their date.
pub fn parse_stop_time(raw: &str) -> Option<(NaiveTime, Option<NaiveDate>)> {
    let raw = raw.trim();
    for fmt in TIME_FORMATS {
        if let Ok(t) = NaiveTime::parse_from_str(raw, fmt) {
            return Some((t, None));
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some((dt.time(), Some(dt.date())));
        }
    }
    None
}

pub fn parse_stop_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| parse_stop_time(raw).and_then(|(_, d)| d))
}

/// Ages may arrive as floats (`"19.0"`); negatives are treated as unusable.
pub fn parse_age(raw: &str) -> Option<u32> {
    let value: f64 = raw.trim().parse().ok()?;
    if value.is_finite() && value >= 0.0 && value <= u32::MAX as f64 {
        Some(value.round() as u32)
    } else {
        None
    }
}

pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" | "1.0" => Some(true),
        "false" | "f" | "0" | "no" | "n" | "0.0" => Some(false),
        _ => None,
    }
}

/// Map known violation spellings to one canonical form.
pub fn standardize_violation(raw: &str) -> Option<String> {
    let key = raw.trim().to_ascii_lowercase();
    let canonical = match key.as_str() {
        "" => return None,
        "speeding" | "speed" => "Speeding",
        "dui" | "drunk driving" | "dwi" => "DUI",
        "seatbelt" | "seat belt" | "seat-belt" => "Seatbelt",
        "signal" | "signal violation" => "Signal",
        "equipment" => "Equipment",
        "registration/plates" | "registration" => "Registration/plates",
        "moving violation" => "Moving violation",
        "other" => "Other",
        _ => return title_case(raw),
    };
    Some(canonical.to_string())
}

/// Short all-caps words are kept as written.
const MAX_ACRONYM_LEN: usize = 3;

/// `"  uNITED   states "` becomes `"United States"`; acronyms such as
/// `"USA"` and `"UK"` keep their spelling.
pub fn title_case(raw: &str) -> Option<String> {
    let words: Vec<String> = raw
        .split_whitespace()
        .map(|word| {
            if word.chars().count() <= MAX_ACRONYM_LEN
                && word.chars().any(|c| c.is_alphabetic())
                && !word.chars().any(|c| c.is_lowercase())
            {
                return word.to_string();
            }
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(|c| c.to_lowercase()))
                    .collect(),
                None => String::new(),
            }
        })
        .collect();
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(columns: &[(&str, Vec<Option<&str>>)]) -> DataFrame {
        let columns = columns
            .iter()
            .map(|(name, values)| Column::new((*name).into(), values.clone()))
            .collect();
        DataFrame::new(columns).unwrap()
    }

    fn base_frame() -> DataFrame {
        frame(&[
            ("stop_date", vec![Some("2024-01-05"), Some("2024-01-06"), Some("2024-01-07")]),
            ("stop_time", vec![Some("22:30:00"), Some("08:15"), Some("not a time")]),
            ("country_name", vec![Some(" india "), None, Some("INDIA")]),
            ("driver_gender", vec![Some("m"), Some("F"), None]),
            ("driver_age", vec![Some("19"), Some("-4"), Some("41")]),
            ("violation", vec![Some("speeding"), Some("Seat Belt"), Some("DUI")]),
            ("search_conducted", vec![Some("False"), Some("True"), Some("False")]),
            ("is_arrested", vec![Some("True"), Some("False"), None]),
            ("drugs_related_stop", vec![Some("0"), Some("1"), Some("0")]),
            ("stop_duration", vec![Some("6-15 Min"), None, Some("<5 min")]),
            ("vehicle_number", vec![Some("rj83pz4441"), None, None]),
            ("empty", vec![None, None, None]),
        ])
    }

    #[test]
    fn drops_all_null_columns() {
        let df = Cleaner::drop_empty_columns(&base_frame()).unwrap();
        assert!(df.column("empty").is_err());
        assert!(df.column("stop_time").is_ok());
    }

    #[test]
    fn drop_policy_skips_bad_timestamps() {
        let report = Cleaner::new(TimestampPolicy::Drop)
            .clean(&base_frame())
            .unwrap();
        assert_eq!(report.records.len(), 2);
        assert_eq!(
            report.dropped,
            vec![DroppedRow {
                row: 2,
                reason: RowIssue::InvalidTime("not a time".to_string()),
            }]
        );
    }

    #[test]
    fn impute_policy_fills_bad_timestamps() {
        let report = Cleaner::new(TimestampPolicy::Impute)
            .clean(&base_frame())
            .unwrap();
        assert_eq!(report.records.len(), 3);
        assert!(report.dropped.is_empty());
        // Two distinct parsed times tie; the earlier one wins
        assert_eq!(
            report.records[2].stop_time,
            NaiveTime::from_hms_opt(8, 15, 0).unwrap()
        );
    }

    #[test]
    fn standardizes_and_imputes() {
        let report = Cleaner::default().clean(&base_frame()).unwrap();
        let first = &report.records[0];
        let second = &report.records[1];

        assert_eq!(first.country_name, "India");
        assert_eq!(second.country_name, "India");
        assert_eq!(first.violation, "Speeding");
        assert_eq!(second.violation, "Seatbelt");
        assert_eq!(first.driver_gender, Gender::Male);
        assert_eq!(first.vehicle_number, "RJ83PZ4441");
        assert_eq!(second.vehicle_number, "Unknown");
        assert_eq!(second.search_type, "None Conducted");
        // mean of 19 and 41
        assert_eq!(second.driver_age, 30);
        assert_eq!(second.stop_duration, StopDuration::UnderFive);
        assert!(first.is_arrested);
        assert!(second.drugs_related_stop);
    }

    #[test]
    fn cleaned_rows_hold_invariants() {
        let report = Cleaner::new(TimestampPolicy::Impute)
            .clean(&base_frame())
            .unwrap();
        let ages: Vec<u32> = report.records.iter().map(|s| s.driver_age).collect();
        assert_eq!(ages, vec![19, 30, 41]);
        for stop in &report.records {
            let stamp = stop.stop_date.and_time(stop.stop_time);
            assert_eq!(
                NaiveDateTime::parse_from_str(&stamp.to_string(), "%Y-%m-%d %H:%M:%S").ok(),
                Some(stamp)
            );
        }
    }

    #[test]
    fn datetime_in_time_column_supplies_date() {
        let df = frame(&[
            ("stop_time", vec![Some("2023-03-01 23:05:00")]),
            ("driver_age", vec![Some("50")]),
            ("violation", vec![Some("Other")]),
            ("is_arrested", vec![Some("no")]),
        ]);
        let report = Cleaner::default().clean(&df).unwrap();
        let stop = &report.records[0];
        assert_eq!(stop.stop_date, NaiveDate::from_ymd_opt(2023, 3, 1).unwrap());
        assert_eq!(stop.stop_time, NaiveTime::from_hms_opt(23, 5, 0).unwrap());
        assert!(!stop.is_arrested);
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let df = frame(&[("stop_time", vec![Some("10:00")])]);
        let err = Cleaner::default().clean(&df).unwrap_err();
        assert!(matches!(err, CleanerError::MissingColumn("is_arrested")));
    }

    #[test]
    fn no_valid_age_drops_row() {
        let df = frame(&[
            ("stop_date", vec![Some("2024-01-01")]),
            ("stop_time", vec![Some("10:00")]),
            ("driver_age", vec![Some("-1")]),
            ("violation", vec![Some("Other")]),
            ("is_arrested", vec![Some("no")]),
        ]);
        let report = Cleaner::default().clean(&df).unwrap();
        assert!(report.records.is_empty());
        assert_eq!(report.dropped[0].reason, RowIssue::NoValidAge);
    }

    #[test]
    fn parsers_accept_common_spellings() {
        assert_eq!(parse_bool("YES"), Some(true));
        assert_eq!(parse_bool("maybe"), None);
        assert_eq!(parse_age("19.0"), Some(19));
        assert_eq!(parse_age("-3"), None);
        assert_eq!(parse_stop_date("01/31/2024"), NaiveDate::from_ymd_opt(2024, 1, 31));
        assert_eq!(
            parse_stop_time("22:30").map(|(t, _)| t),
            NaiveTime::from_hms_opt(22, 30, 0)
        );
        assert_eq!(title_case("  uNITED   states "), Some("United States".to_string()));
        assert_eq!(standardize_violation("drunk driving"), Some("DUI".to_string()));
        assert_eq!(standardize_violation("   "), None);
    }

    #[test]
    fn country_acronyms_keep_their_spelling() {
        assert_eq!(title_case("USA"), Some("USA".to_string()));
        assert_eq!(title_case(" UK "), Some("UK".to_string()));
        assert_eq!(title_case("INDIA"), Some("India".to_string()));
        assert_eq!(title_case("usa"), Some("Usa".to_string()));
    }
}
