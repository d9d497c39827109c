use securecheck::config::{AppConfig, TimestampPolicy};
use securecheck::db::{Database, StorageError};
use securecheck::pipeline::ingest_to_path;
use securecheck::queries::{search_logs, AnalyticsQuery, QueryParams};
use securecheck::stats::{chi_square_independence, contingency_table, CategoricalColumn};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const HEADER: &str = "stop_date,stop_time,country_name,driver_gender,driver_age_raw,driver_age,\
driver_race,violation_raw,violation,search_conducted,search_type,stop_outcome,is_arrested,\
stop_duration,drugs_related_stop,vehicle_number";

// Six source rows: one with an impossible time, one with no time at all.
const ROWS: [&str; 6] = [
    "2020-01-01,08:00:00,india,M,19.0,19.0,Asian,Speeding,Speeding,False,,Citation,True,0-15 Min,False,RJ01AB1234",
    "2020-01-01,10:30:00,India,F,34.0,34.0,Other,Signal,Signal,True,Vehicle Search,Warning,False,16-30 Min,True,MH12CD5678",
    "2020-01-02,20:00:00,Canada,M,45.0,45.0,White,DUI,DUI,True,Frisk,Arrest,True,30+ Min,True,",
    "2020-01-02,23:15:00,Canada,F,,,Black,Speeding,Speeding,False,,Arrest,True,0-15 Min,False,ON4455",
    "2020-01-03,25:99:00,India,M,61.0,61.0,Asian,Seatbelt,Seatbelt,False,,Warning,False,0-15 Min,False,KA09ZZ0001",
    "2020-01-03,,USA,F,28.0,28.0,White,Speeding,Speeding,False,,Citation,False,16-30 Min,False,TX-1000",
];

fn write_csv(dir: &Path) -> PathBuf {
    let path = dir.join("traffic_stops.csv");
    let mut text = String::from(HEADER);
    for row in ROWS {
        text.push('\n');
        text.push_str(row);
    }
    text.push('\n');
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn row_count_is_source_minus_dropped() {
    let dir = TempDir::new().unwrap();
    let csv = write_csv(dir.path());
    let db_path = dir.path().join("police_logs.db");

    let summary = ingest_to_path(&csv, &db_path, &AppConfig::default(), true).unwrap();
    assert_eq!(summary.rows_read, 6);
    assert_eq!(summary.dropped.len(), 2);
    assert_eq!(summary.rows_persisted, 4);

    let db = Database::open_existing(&db_path).unwrap();
    assert_eq!(db.count_rows().unwrap(), summary.rows_read - summary.dropped.len());
}

#[test]
fn arrest_rate_by_time_of_day_after_ingest() {
    let dir = TempDir::new().unwrap();
    let csv = write_csv(dir.path());
    let db_path = dir.path().join("police_logs.db");
    ingest_to_path(&csv, &db_path, &AppConfig::default(), true).unwrap();

    let db = Database::open_existing(&db_path).unwrap();
    let result = AnalyticsQuery::ArrestRateByTimeOfDay
        .run(&db, &QueryParams::default())
        .unwrap();

    let labels: Vec<String> = result
        .column("time_of_day")
        .unwrap()
        .iter()
        .map(|c| c.to_string())
        .collect();
    assert_eq!(labels, ["Day", "Night"]);

    let rates: Vec<f64> = result
        .column("arrest_rate")
        .unwrap()
        .iter()
        .filter_map(|c| c.as_f64())
        .collect();
    assert_eq!(rates, [50.0, 100.0]);
}

#[test]
fn append_then_replace() {
    let dir = TempDir::new().unwrap();
    let csv = write_csv(dir.path());
    let db_path = dir.path().join("police_logs.db");
    let config = AppConfig::default();

    ingest_to_path(&csv, &db_path, &config, false).unwrap();
    let appended = ingest_to_path(&csv, &db_path, &config, false).unwrap();
    assert_eq!(appended.table_rows, 8);

    let replaced = ingest_to_path(&csv, &db_path, &config, true).unwrap();
    assert_eq!(replaced.table_rows, 4);
}

#[test]
fn impute_policy_keeps_bad_timestamps() {
    let dir = TempDir::new().unwrap();
    let csv = write_csv(dir.path());
    let db_path = dir.path().join("police_logs.db");
    let mut config = AppConfig::default();
    config.cleaning.timestamp_policy = TimestampPolicy::Impute;

    let summary = ingest_to_path(&csv, &db_path, &config, true).unwrap();
    assert!(summary.dropped.is_empty());
    assert_eq!(summary.table_rows, 6);
}

#[test]
fn cleaned_values_are_standardized_in_storage() {
    let dir = TempDir::new().unwrap();
    let csv = write_csv(dir.path());
    let db_path = dir.path().join("police_logs.db");
    ingest_to_path(&csv, &db_path, &AppConfig::default(), true).unwrap();

    let db = Database::open_existing(&db_path).unwrap();
    let india = search_logs(&db, Some("india"), 50).unwrap();
    assert_eq!(india.rows.len(), 2);
    let countries = india.column("country_name").unwrap();
    assert!(countries.iter().all(|c| c.to_string() == "India"));

    let unknown = search_logs(&db, Some("Unknown"), 50).unwrap();
    assert_eq!(unknown.rows.len(), 1);

    let min_age: i64 = db
        .connection()
        .query_row("SELECT MIN(driver_age) FROM traffic_stops", [], |r| r.get(0))
        .unwrap();
    assert!(min_age >= 0);
}

#[test]
fn chi_square_runs_over_ingested_table() {
    let dir = TempDir::new().unwrap();
    let csv = write_csv(dir.path());
    let db_path = dir.path().join("police_logs.db");
    ingest_to_path(&csv, &db_path, &AppConfig::default(), true).unwrap();

    let db = Database::open_existing(&db_path).unwrap();
    let table =
        contingency_table(&db, CategoricalColumn::Violation, CategoricalColumn::IsArrested).unwrap();
    assert_eq!(table.total(), 4);

    let test = chi_square_independence(&table).unwrap();
    assert!((0.0..=1.0).contains(&test.p_value));
}

#[test]
fn opening_an_unloaded_database_fails() {
    let dir = TempDir::new().unwrap();
    let err = Database::open_existing(&dir.path().join("missing.db"))
        .err()
        .unwrap();
    assert!(matches!(
        err,
        StorageError::NotInitialized(_) | StorageError::Open { .. }
    ));
}

#[test]
fn missing_csv_is_an_error() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("police_logs.db");
    let result = ingest_to_path(
        &dir.path().join("nope.csv"),
        &db_path,
        &AppConfig::default(),
        true,
    );
    assert!(result.is_err());
}

#[test]
fn source_spellings_survive_ingest() {
    let dir = TempDir::new().unwrap();
    let csv = write_csv(dir.path());
    let db_path = dir.path().join("police_logs.db");
    let mut config = AppConfig::default();
    config.cleaning.timestamp_policy = TimestampPolicy::Impute;
    ingest_to_path(&csv, &db_path, &config, true).unwrap();

    let db = Database::open_existing(&db_path).unwrap();
    let lookup = |vehicle: &str| -> (String, String) {
        db.connection()
            .query_row(
                "SELECT country_name, stop_duration FROM traffic_stops WHERE vehicle_number = ?1",
                [vehicle],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap()
    };
    assert_eq!(lookup("TX-1000"), ("USA".to_string(), "16-30 min".to_string()));
    assert_eq!(lookup("RJ01AB1234"), ("India".to_string(), "0-15 min".to_string()));
}

#[test]
fn fresh_database_file_starts_empty() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("police_logs.db");

    let db = Database::open(&db_path).unwrap();
    assert_eq!(db.count_rows().unwrap(), 0);
    drop(db);

    let reopened = Database::open_existing(&db_path).unwrap();
    assert_eq!(reopened.count_rows().unwrap(), 0);
}
