//! CSV Data Loader Module
//! Reads the raw traffic-stop CSV into a Polars DataFrame.

use polars::prelude::*;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
}

/// Holds the raw CSV table. Every column is read as text so that type
/// coercion happens in one place, the cleaner.
pub struct DataLoader {
    df: Option<DataFrame>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self { df: None }
    }

    /// Load a CSV file using Polars.
    pub fn load_csv(&mut self, file_path: &Path) -> Result<&DataFrame, LoaderError> {
        // Schema inference over zero rows reads every column as String
        let df = LazyCsvReader::new(file_path)
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;

        info!(
            path = %file_path.display(),
            rows = df.height(),
            columns = df.width(),
            "loaded raw CSV"
        );

        Ok(&*self.df.insert(df))
    }

    /// Get list of column names from loaded DataFrame.
    pub fn get_columns(&self) -> Vec<String> {
        self.df
            .as_ref()
            .map(|df| {
                df.get_column_names()
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get the number of rows in the DataFrame.
    pub fn get_row_count(&self) -> usize {
        self.df.as_ref().map(|df| df.height()).unwrap_or(0)
    }

    /// Get a reference to the loaded DataFrame.
    pub fn get_dataframe(&self) -> Option<&DataFrame> {
        self.df.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_every_column_as_text() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "stop_time,driver_age,is_arrested").unwrap();
        writeln!(file, "22:30,19,True").unwrap();
        writeln!(file, "08:00,,False").unwrap();

        let mut loader = DataLoader::new();
        let df = loader.load_csv(file.path()).unwrap();
        assert_eq!(df.height(), 2);
        for column in df.get_columns() {
            assert_eq!(column.dtype(), &DataType::String);
        }
        assert_eq!(loader.get_row_count(), 2);
        assert_eq!(
            loader.get_columns(),
            vec!["stop_time", "driver_age", "is_arrested"]
        );
    }

    #[test]
    fn missing_file_is_an_error() {
        let mut loader = DataLoader::new();
        let result = loader.load_csv(Path::new("/nonexistent/traffic_stops.csv"));
        assert!(matches!(result, Err(LoaderError::CsvError(_))));
        assert!(loader.get_dataframe().is_none());
    }
}
