//! Traffic Stop Record Types
//! Cleaned stop rows and the categorical columns they carry.

use chrono::{NaiveDate, NaiveTime};
use std::fmt;

/// Driver gender after standardization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    /// Accepts `M`/`F`, full words, any case.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" => None,
            "m" | "male" | "man" => Some(Gender::Male),
            "f" | "female" | "woman" => Some(Gender::Female),
            _ => Some(Gender::Other),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
            Gender::Other => "Other",
        }
    }
}

/// Bucketed stop length as recorded by officers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StopDuration {
    UnderFive,
    ZeroToFifteen,
    SixToFifteen,
    SixteenToThirty,
    OverThirty,
}

impl StopDuration {
    pub const ALL: [StopDuration; 5] = [
        StopDuration::UnderFive,
        StopDuration::ZeroToFifteen,
        StopDuration::SixToFifteen,
        StopDuration::SixteenToThirty,
        StopDuration::OverThirty,
    ];

    /// Tolerates spacing and case differences: `"6-15 Min"`, `"6 - 15 min"`.
    pub fn parse(raw: &str) -> Option<Self> {
        let key: String = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.trim_end_matches("min").trim_end_matches("mins") {
            "<5" => Some(StopDuration::UnderFive),
            "0-15" => Some(StopDuration::ZeroToFifteen),
            "6-15" => Some(StopDuration::SixToFifteen),
            "16-30" => Some(StopDuration::SixteenToThirty),
            "30+" | ">30" => Some(StopDuration::OverThirty),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StopDuration::UnderFive => "<5 min",
            StopDuration::ZeroToFifteen => "0-15 min",
            StopDuration::SixToFifteen => "6-15 min",
            StopDuration::SixteenToThirty => "16-30 min",
            StopDuration::OverThirty => "30+ min",
        }
    }
}

/// Day/night bucket derived from the stop time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeOfDay {
    Day,
    Night,
}

impl TimeOfDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Day => "Day",
            TimeOfDay::Night => "Night",
        }
    }
}

/// Three-way driver age bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeCategory {
    Young,
    Adult,
    Senior,
}

impl AgeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgeCategory::Young => "Young",
            AgeCategory::Adult => "Adult",
            AgeCategory::Senior => "Senior",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(Gender, StopDuration, TimeOfDay, AgeCategory);

/// A stop after cleaning: every required field present and typed.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanStop {
    pub stop_date: NaiveDate,
    pub stop_time: NaiveTime,
    pub country_name: String,
    pub driver_gender: Gender,
    pub driver_age: u32,
    pub driver_race: String,
    pub violation_raw: String,
    pub violation: String,
    pub search_conducted: bool,
    pub search_type: String,
    pub stop_outcome: String,
    pub is_arrested: bool,
    pub stop_duration: StopDuration,
    pub drugs_related_stop: bool,
    pub vehicle_number: String,
}

/// A cleaned stop plus its derived features, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct StopRecord {
    pub stop: CleanStop,
    pub time_of_day: TimeOfDay,
    pub age_category: AgeCategory,
}
