//! Query results as plain rows of typed cells, plus CSV/JSON export.

use crate::db::StorageError;
use polars::prelude::*;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, Params};
use serde::Serialize;
use std::fmt;
use std::fs::{self, File};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One value of a result row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Cell {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Integer(i) => Some(*i as f64),
            Cell::Real(f) => Some(*f),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }
}

impl From<ValueRef<'_>> for Cell {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Cell::Null,
            ValueRef::Integer(i) => Cell::Integer(i),
            ValueRef::Real(f) => Cell::Real(f),
            ValueRef::Text(t) => Cell::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Cell::Text(format!("<{} bytes>", b.len())),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => f.write_str("-"),
            Cell::Integer(i) => write!(f, "{}", i),
            Cell::Real(v) => write!(f, "{:.2}", v),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

/// Column names and rows returned by one statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&Cell>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().filter_map(|row| row.get(idx)).collect())
    }

    /// Convert to a DataFrame, typing each column from its cells.
    pub fn to_dataframe(&self) -> Result<DataFrame, PolarsError> {
        let columns = self
            .columns
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let cells: Vec<&Cell> = self.rows.iter().filter_map(|r| r.get(idx)).collect();
                let name: PlSmallStr = name.as_str().into();
                if cells
                    .iter()
                    .all(|c| matches!(c, Cell::Integer(_) | Cell::Null))
                {
                    let values: Vec<Option<i64>> = cells
                        .iter()
                        .map(|c| match c {
                            Cell::Integer(i) => Some(*i),
                            _ => None,
                        })
                        .collect();
                    Column::new(name, values)
                } else if cells
                    .iter()
                    .all(|c| matches!(c, Cell::Integer(_) | Cell::Real(_) | Cell::Null))
                {
                    let values: Vec<Option<f64>> = cells.iter().map(|c| c.as_f64()).collect();
                    Column::new(name, values)
                } else {
                    let values: Vec<Option<String>> = cells
                        .iter()
                        .map(|c| match c {
                            Cell::Null => None,
                            Cell::Text(s) => Some(s.clone()),
                            other => Some(other.to_string()),
                        })
                        .collect();
                    Column::new(name, values)
                }
            })
            .collect();
        DataFrame::new(columns)
    }

    pub fn write_csv(&self, path: &Path) -> Result<(), ExportError> {
        let mut df = self.to_dataframe()?;
        let mut file = File::create(path)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut df)?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: &Path) -> Result<(), ExportError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Run a statement and collect every row.
pub(crate) fn fetch<P: Params>(
    conn: &Connection,
    title: &str,
    sql: &str,
    params: P,
) -> Result<QueryResult, StorageError> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(String::from)
        .collect();
    let width = columns.len();

    let mut rows = stmt.query(params)?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(width);
        for i in 0..width {
            cells.push(Cell::from(row.get_ref(i)?));
        }
        out.push(cells);
    }

    Ok(QueryResult {
        title: title.to_string(),
        columns,
        rows: out,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> QueryResult {
        QueryResult {
            title: "Arrests".into(),
            columns: vec!["label".into(), "count".into(), "rate".into()],
            rows: vec![
                vec![Cell::Text("Day".into()), Cell::Integer(4), Cell::Real(25.0)],
                vec![Cell::Text("Night".into()), Cell::Integer(4), Cell::Integer(75)],
            ],
        }
    }

    #[test]
    fn dataframe_columns_are_typed() {
        let df = sample().to_dataframe().unwrap();
        assert_eq!(df.shape(), (2, 3));
        assert_eq!(df.column("label").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("count").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("rate").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn csv_export_writes_header_and_rows() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        sample().write_csv(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("label,count,rate"));
        assert_eq!(lines.count(), 2);
    }

    #[test]
    fn json_uses_plain_values() {
        let json: serde_json::Value = serde_json::from_str(&sample().to_json().unwrap()).unwrap();
        assert_eq!(json["rows"][0][0], "Day");
        assert_eq!(json["rows"][1][1], 4);
        assert_eq!(json["rows"][0][2], 25.0);
    }
}
