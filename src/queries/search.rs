//! Latest-log lookup with a country / vehicle number filter.

use super::result::{fetch, QueryResult};
use crate::db::{Database, StorageError};
use rusqlite::params;

/// Rows shown in the dashboard's latest-logs table.
pub const LATEST_LOGS_LIMIT: u32 = 50;

const SEARCH_SQL: &str = r"
    SELECT stop_id, stop_date, stop_time, country_name, vehicle_number,
           violation, stop_outcome, is_arrested, drugs_related_stop
    FROM traffic_stops
    WHERE ?1 IS NULL
       OR country_name LIKE ?1 ESCAPE '\'
       OR vehicle_number LIKE ?1 ESCAPE '\'
    ORDER BY stop_date DESC, stop_time DESC, stop_id DESC
    LIMIT ?2";

/// `term` is matched as a literal substring; `%` and `_` are escaped.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Most recent stops, optionally filtered by a search term.
pub fn search_logs(
    db: &Database,
    term: Option<&str>,
    limit: u32,
) -> Result<QueryResult, StorageError> {
    let pattern = term
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(like_pattern);
    fetch(
        db.connection(),
        "Latest Logs",
        SEARCH_SQL,
        params![pattern, i64::from(limit)],
    )
}
