//! traffic_stops inserts.

use super::{Database, StorageError, CREATE_TABLE_SQL, DROP_TABLE_SQL};
use crate::data::StopRecord;
use rusqlite::{params, Connection};
use tracing::info;

const INSERT_SQL: &str = "
    INSERT INTO traffic_stops
        (stop_date, stop_time, country_name, driver_gender, driver_age, driver_race,
         violation_raw, violation, search_conducted, search_type, stop_outcome,
         is_arrested, stop_duration, drugs_related_stop, vehicle_number,
         time_of_day, age_category)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)";

fn insert_one(conn: &Connection, record: &StopRecord) -> Result<i64, StorageError> {
    let s = &record.stop;
    let mut stmt = conn.prepare_cached(INSERT_SQL)?;
    stmt.execute(params![
        s.stop_date.format("%Y-%m-%d").to_string(),
        s.stop_time.format("%H:%M:%S").to_string(),
        s.country_name,
        s.driver_gender.as_str(),
        s.driver_age,
        s.driver_race,
        s.violation_raw,
        s.violation,
        s.search_conducted,
        s.search_type,
        s.stop_outcome,
        s.is_arrested,
        s.stop_duration.as_str(),
        s.drugs_related_stop,
        s.vehicle_number,
        record.time_of_day.as_str(),
        record.age_category.as_str(),
    ])?;
    Ok(conn.last_insert_rowid())
}

impl Database {
    /// Bulk insert in one transaction: all rows land or none do.
    pub fn insert_records(&mut self, records: &[StopRecord]) -> Result<usize, StorageError> {
        let tx = self.conn.transaction()?;
        for record in records {
            insert_one(&tx, record)?;
        }
        tx.commit()?;
        info!(rows = records.len(), "stops loaded into traffic_stops");
        Ok(records.len())
    }

    /// Recreate the table and load `records`, all in one transaction. On
    /// failure the previous contents are left untouched.
    pub fn replace_records(&mut self, records: &[StopRecord]) -> Result<usize, StorageError> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(DROP_TABLE_SQL)?;
        tx.execute_batch(CREATE_TABLE_SQL)?;
        for record in records {
            insert_one(&tx, record)?;
        }
        tx.commit()?;
        info!(rows = records.len(), "traffic_stops table replaced");
        Ok(records.len())
    }

    /// Append a single manually logged stop, returning its `stop_id`.
    pub fn insert_record(&self, record: &StopRecord) -> Result<i64, StorageError> {
        let id = insert_one(&self.conn, record)?;
        info!(stop_id = id, "new stop logged");
        Ok(id)
    }
}
