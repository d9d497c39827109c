//! Feature Deriver
//! Day/night and age buckets computed from cleaned stops.

use crate::config::FeatureThresholds;
use crate::data::record::{AgeCategory, CleanStop, StopRecord, TimeOfDay};
use chrono::{NaiveTime, Timelike};

/// Pure per-row derivation; identical input always yields identical output.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureDeriver {
    thresholds: FeatureThresholds,
}

impl FeatureDeriver {
    pub fn new(thresholds: FeatureThresholds) -> Self {
        Self { thresholds }
    }

    pub fn time_of_day(&self, time: NaiveTime) -> TimeOfDay {
        let hour = time.hour();
        if hour >= self.thresholds.day_start_hour && hour < self.thresholds.night_start_hour {
            TimeOfDay::Day
        } else {
            TimeOfDay::Night
        }
    }

    pub fn age_category(&self, age: u32) -> AgeCategory {
        if age <= self.thresholds.young_max_age {
            AgeCategory::Young
        } else if age >= self.thresholds.senior_min_age {
            AgeCategory::Senior
        } else {
            AgeCategory::Adult
        }
    }

    pub fn derive(&self, stop: CleanStop) -> StopRecord {
        StopRecord {
            time_of_day: self.time_of_day(stop.stop_time),
            age_category: self.age_category(stop.driver_age),
            stop,
        }
    }

    pub fn derive_all(&self, stops: Vec<CleanStop>) -> Vec<StopRecord> {
        stops.into_iter().map(|stop| self.derive(stop)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::{Gender, StopDuration};
    use chrono::NaiveDate;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn late_evening_is_night() {
        let deriver = FeatureDeriver::default();
        assert_eq!(deriver.time_of_day(hm(22, 30)), TimeOfDay::Night);
        assert_eq!(deriver.time_of_day(hm(5, 59)), TimeOfDay::Night);
        assert_eq!(deriver.time_of_day(hm(6, 0)), TimeOfDay::Day);
        assert_eq!(deriver.time_of_day(hm(17, 59)), TimeOfDay::Day);
        assert_eq!(deriver.time_of_day(hm(18, 0)), TimeOfDay::Night);
    }

    #[test]
    fn age_buckets() {
        let deriver = FeatureDeriver::default();
        assert_eq!(deriver.age_category(19), AgeCategory::Young);
        assert_eq!(deriver.age_category(25), AgeCategory::Young);
        assert_eq!(deriver.age_category(26), AgeCategory::Adult);
        assert_eq!(deriver.age_category(59), AgeCategory::Adult);
        assert_eq!(deriver.age_category(60), AgeCategory::Senior);
    }

    #[test]
    fn custom_thresholds_apply() {
        let deriver = FeatureDeriver::new(FeatureThresholds {
            day_start_hour: 7,
            night_start_hour: 20,
            young_max_age: 21,
            senior_min_age: 65,
        });
        assert_eq!(deriver.time_of_day(hm(19, 0)), TimeOfDay::Day);
        assert_eq!(deriver.time_of_day(hm(6, 30)), TimeOfDay::Night);
        assert_eq!(deriver.age_category(22), AgeCategory::Adult);
    }

    #[test]
    fn derivation_is_deterministic() {
        let stop = CleanStop {
            stop_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            stop_time: hm(22, 30),
            country_name: "India".into(),
            driver_gender: Gender::Female,
            driver_age: 19,
            driver_race: "Unknown".into(),
            violation_raw: "Speeding".into(),
            violation: "Speeding".into(),
            search_conducted: false,
            search_type: "None Conducted".into(),
            stop_outcome: "Warning".into(),
            is_arrested: false,
            stop_duration: StopDuration::UnderFive,
            drugs_related_stop: false,
            vehicle_number: "Unknown".into(),
        };
        let deriver = FeatureDeriver::default();
        let first = deriver.derive(stop.clone());
        let second = deriver.derive(stop);
        assert_eq!(first, second);
        assert_eq!(first.time_of_day, TimeOfDay::Night);
        assert_eq!(first.age_category, AgeCategory::Young);
    }
}
