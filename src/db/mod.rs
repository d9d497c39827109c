//! Database module - SQLite persistence for the traffic-stop log.
//!
//! A single fact table, `traffic_stops`, written once per ingest and
//! appended to by manual log entries. Rows are never updated.

mod stops;

use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const TABLE_NAME: &str = "traffic_stops";

const DROP_TABLE_SQL: &str = "DROP TABLE IF EXISTS traffic_stops;";

const CREATE_TABLE_SQL: &str = "
    CREATE TABLE IF NOT EXISTS traffic_stops (
        stop_id INTEGER PRIMARY KEY AUTOINCREMENT,
        stop_date TEXT NOT NULL,
        stop_time TEXT NOT NULL,
        country_name TEXT NOT NULL CHECK (country_name <> ''),
        driver_gender TEXT NOT NULL,
        driver_age INTEGER NOT NULL CHECK (driver_age >= 0),
        driver_race TEXT,
        violation_raw TEXT,
        violation TEXT NOT NULL CHECK (violation <> ''),
        search_conducted INTEGER NOT NULL,
        search_type TEXT,
        stop_outcome TEXT,
        is_arrested INTEGER NOT NULL,
        stop_duration TEXT,
        drugs_related_stop INTEGER NOT NULL,
        vehicle_number TEXT,
        time_of_day TEXT NOT NULL,
        age_category TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_traffic_stops_recent
        ON traffic_stops (stop_date DESC, stop_time DESC);
";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to open database {path}: {source}")]
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },
    #[error("Database {0} has no traffic_stops table; run `securecheck ingest` first")]
    NotInitialized(PathBuf),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Owns the one connection the application uses.
pub struct Database {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Database {
    /// Open (creating if needed) a file-backed database and ensure the schema.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        db.create_schema()?;
        info!(path = %path.display(), "database opened");
        Ok(db)
    }

    /// Open a database that a previous ingest must already have populated.
    pub fn open_existing(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| StorageError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        if !db.table_exists()? {
            return Err(StorageError::NotInitialized(path.to_path_buf()));
        }
        Ok(db)
    }

    /// In-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let db = Self {
            conn: Connection::open_in_memory()?,
            path: None,
        };
        db.create_schema()?;
        Ok(db)
    }

    /// Idempotent.
    pub fn create_schema(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(CREATE_TABLE_SQL)?;
        Ok(())
    }

    pub fn count_rows(&self) -> Result<usize, StorageError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM traffic_stops", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn table_exists(&self) -> Result<bool, StorageError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [TABLE_NAME],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Raw read access for the query layer.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Database file path (None for in-memory).
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
