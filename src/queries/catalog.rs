//! Analytics query catalog.
//! Each entry is a fixed, parameterized, read-only statement.

use super::result::{fetch, QueryResult};
use crate::db::{Database, StorageError};
use rusqlite::params_from_iter;
use tracing::debug;

/// Bound values for the parameterized entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryParams {
    /// Row cap for ranking queries
    pub limit: u32,
    /// Groups with fewer stops are left out
    pub min_stops: u32,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            limit: 10,
            min_stops: 1,
        }
    }
}

/// Which result columns a bar chart plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSpec {
    pub label_column: &'static str,
    pub value_column: &'static str,
    pub value_label: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum AnalyticsQuery {
    ArrestRateByTimeOfDay,
    ArrestRateByAgeCategory,
    ArrestRateByAgeGroup,
    ViolationSearchArrestRates,
    DrugStopRateByCountry,
    TopDrugVehicles,
    StopDurationByViolation,
}

const ARREST_RATE_BY_TIME_OF_DAY: &str = "
    SELECT time_of_day,
           COUNT(*) AS total_stops,
           SUM(CASE WHEN is_arrested = 1 THEN 1 ELSE 0 END) AS arrests,
           CAST(SUM(CASE WHEN is_arrested = 1 THEN 1 ELSE 0 END) AS REAL) * 100 / COUNT(*)
               AS arrest_rate
    FROM traffic_stops
    GROUP BY time_of_day
    ORDER BY time_of_day";

const ARREST_RATE_BY_AGE_CATEGORY: &str = "
    SELECT age_category,
           COUNT(*) AS total_stops,
           SUM(CASE WHEN is_arrested = 1 THEN 1 ELSE 0 END) AS arrests,
           CAST(SUM(CASE WHEN is_arrested = 1 THEN 1 ELSE 0 END) AS REAL) * 100 / COUNT(*)
               AS arrest_rate
    FROM traffic_stops
    GROUP BY age_category
    ORDER BY CASE age_category WHEN 'Young' THEN 0 WHEN 'Adult' THEN 1 ELSE 2 END";

const ARREST_RATE_BY_AGE_GROUP: &str = "
    SELECT CASE
               WHEN driver_age BETWEEN 16 AND 25 THEN '16-25'
               WHEN driver_age BETWEEN 26 AND 35 THEN '26-35'
               WHEN driver_age BETWEEN 36 AND 45 THEN '36-45'
               WHEN driver_age > 45 THEN '46+'
               ELSE 'Under 16'
           END AS age_group,
           COUNT(*) AS total_stops,
           CAST(SUM(CASE WHEN is_arrested = 1 THEN 1 ELSE 0 END) AS REAL) * 100 / COUNT(*)
               AS arrest_rate
    FROM traffic_stops
    GROUP BY age_group
    ORDER BY arrest_rate DESC, age_group";

const VIOLATION_SEARCH_ARREST_RATES: &str = "
    SELECT violation,
           COUNT(*) AS total_stops,
           CAST(SUM(CASE WHEN search_conducted = 1 THEN 1 ELSE 0 END) AS REAL) * 100 / COUNT(*)
               AS search_rate,
           CAST(SUM(CASE WHEN is_arrested = 1 THEN 1 ELSE 0 END) AS REAL) * 100 / COUNT(*)
               AS arrest_rate,
           (CAST(SUM(CASE WHEN search_conducted = 1 THEN 1 ELSE 0 END) AS REAL) * 100 / COUNT(*)
            + CAST(SUM(CASE WHEN is_arrested = 1 THEN 1 ELSE 0 END) AS REAL) * 100 / COUNT(*)) / 2
               AS combined_rate
    FROM traffic_stops
    GROUP BY violation
    ORDER BY combined_rate DESC, violation";

const DRUG_STOP_RATE_BY_COUNTRY: &str = "
    SELECT country_name,
           COUNT(*) AS total_stops,
           SUM(CASE WHEN drugs_related_stop = 1 THEN 1 ELSE 0 END) AS drug_stops,
           CAST(SUM(CASE WHEN drugs_related_stop = 1 THEN 1 ELSE 0 END) AS REAL) * 100 / COUNT(*)
               AS drug_stop_rate
    FROM traffic_stops
    GROUP BY country_name
    HAVING COUNT(*) >= ?1
    ORDER BY drug_stop_rate DESC, country_name";

const TOP_DRUG_VEHICLES: &str = "
    SELECT vehicle_number, COUNT(*) AS drug_stop_count
    FROM traffic_stops
    WHERE drugs_related_stop = 1
      AND vehicle_number IS NOT NULL
      AND vehicle_number <> 'Unknown'
    GROUP BY vehicle_number
    ORDER BY drug_stop_count DESC, vehicle_number
    LIMIT ?1";

const STOP_DURATION_BY_VIOLATION: &str = "
    SELECT violation, stop_duration, COUNT(*) AS stops
    FROM traffic_stops
    GROUP BY violation, stop_duration
    ORDER BY violation, stop_duration";

impl AnalyticsQuery {
    pub const ALL: [AnalyticsQuery; 7] = [
        AnalyticsQuery::ArrestRateByTimeOfDay,
        AnalyticsQuery::ArrestRateByAgeCategory,
        AnalyticsQuery::ArrestRateByAgeGroup,
        AnalyticsQuery::ViolationSearchArrestRates,
        AnalyticsQuery::DrugStopRateByCountry,
        AnalyticsQuery::TopDrugVehicles,
        AnalyticsQuery::StopDurationByViolation,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            AnalyticsQuery::ArrestRateByTimeOfDay => "Arrest Rate: Day vs Night",
            AnalyticsQuery::ArrestRateByAgeCategory => "Arrest Rate by Age Category",
            AnalyticsQuery::ArrestRateByAgeGroup => "Arrest Rate by Driver Age Group",
            AnalyticsQuery::ViolationSearchArrestRates => {
                "Violations with High Search/Arrest Rates"
            }
            AnalyticsQuery::DrugStopRateByCountry => "Drug-Related Stop Rate by Country",
            AnalyticsQuery::TopDrugVehicles => "Top Vehicles in Drug-Related Stops",
            AnalyticsQuery::StopDurationByViolation => "Stop Duration by Violation",
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            AnalyticsQuery::ArrestRateByTimeOfDay => ARREST_RATE_BY_TIME_OF_DAY,
            AnalyticsQuery::ArrestRateByAgeCategory => ARREST_RATE_BY_AGE_CATEGORY,
            AnalyticsQuery::ArrestRateByAgeGroup => ARREST_RATE_BY_AGE_GROUP,
            AnalyticsQuery::ViolationSearchArrestRates => VIOLATION_SEARCH_ARREST_RATES,
            AnalyticsQuery::DrugStopRateByCountry => DRUG_STOP_RATE_BY_COUNTRY,
            AnalyticsQuery::TopDrugVehicles => TOP_DRUG_VEHICLES,
            AnalyticsQuery::StopDurationByViolation => STOP_DURATION_BY_VIOLATION,
        }
    }

    /// Bar chart mapping, if the result is one label per value.
    pub fn chart(&self) -> Option<ChartSpec> {
        let spec = |label_column, value_column, value_label| ChartSpec {
            label_column,
            value_column,
            value_label,
        };
        match self {
            AnalyticsQuery::ArrestRateByTimeOfDay => {
                Some(spec("time_of_day", "arrest_rate", "Arrest rate (%)"))
            }
            AnalyticsQuery::ArrestRateByAgeCategory => {
                Some(spec("age_category", "arrest_rate", "Arrest rate (%)"))
            }
            AnalyticsQuery::ArrestRateByAgeGroup => {
                Some(spec("age_group", "arrest_rate", "Arrest rate (%)"))
            }
            AnalyticsQuery::ViolationSearchArrestRates => {
                Some(spec("violation", "combined_rate", "Combined rate (%)"))
            }
            AnalyticsQuery::DrugStopRateByCountry => {
                Some(spec("country_name", "drug_stop_rate", "Drug-related stops (%)"))
            }
            AnalyticsQuery::TopDrugVehicles => {
                Some(spec("vehicle_number", "drug_stop_count", "Drug-related stops"))
            }
            AnalyticsQuery::StopDurationByViolation => None,
        }
    }

    /// Which parameters the dashboard should offer for this entry.
    pub fn uses_limit(&self) -> bool {
        matches!(self, AnalyticsQuery::TopDrugVehicles)
    }

    pub fn uses_min_stops(&self) -> bool {
        matches!(self, AnalyticsQuery::DrugStopRateByCountry)
    }

    fn bind(&self, params: &QueryParams) -> Vec<i64> {
        match self {
            AnalyticsQuery::DrugStopRateByCountry => vec![i64::from(params.min_stops)],
            AnalyticsQuery::TopDrugVehicles => vec![i64::from(params.limit)],
            _ => Vec::new(),
        }
    }

    pub fn run(&self, db: &Database, params: &QueryParams) -> Result<QueryResult, StorageError> {
        debug!(query = ?self, ?params, "running analytics query");
        fetch(
            db.connection(),
            self.title(),
            self.sql(),
            params_from_iter(self.bind(params)),
        )
    }
}
