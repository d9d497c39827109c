//! Shared fixtures for unit tests.

use crate::data::{CleanStop, FeatureDeriver, Gender, StopDuration, StopRecord};
use chrono::{NaiveDate, NaiveTime};

pub fn stop(time: (u32, u32), age: u32, violation: &str, arrested: bool) -> CleanStop {
    CleanStop {
        stop_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        stop_time: NaiveTime::from_hms_opt(time.0, time.1, 0).unwrap(),
        country_name: "India".to_string(),
        driver_gender: Gender::Male,
        driver_age: age,
        driver_race: "Unknown".to_string(),
        violation_raw: violation.to_string(),
        violation: violation.to_string(),
        search_conducted: false,
        search_type: "None Conducted".to_string(),
        stop_outcome: "Warning".to_string(),
        is_arrested: arrested,
        stop_duration: StopDuration::UnderFive,
        drugs_related_stop: false,
        vehicle_number: "Unknown".to_string(),
    }
}

pub fn record(time: (u32, u32), age: u32, violation: &str, arrested: bool) -> StopRecord {
    FeatureDeriver::default().derive(stop(time, age, violation, arrested))
}
