//! Chi-Square Test Module
//! Pearson's test of independence between two categorical columns.

use crate::db::{Database, StorageError};
use statrs::distribution::{ChiSquared, ContinuousCDF};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::debug;

/// Significance threshold for the test
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Need at least a 2x2 table with non-empty rows and columns, got {rows}x{cols}")]
    InsufficientData { rows: usize, cols: usize },
    #[error("Distribution error: {0}")]
    Distribution(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Columns that may be cross-tabulated. Anything else never reaches SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CategoricalColumn {
    Violation,
    IsArrested,
    SearchConducted,
    DrugsRelatedStop,
    DriverGender,
    CountryName,
    StopDuration,
    StopOutcome,
    TimeOfDay,
    AgeCategory,
}

impl CategoricalColumn {
    pub fn column_name(&self) -> &'static str {
        match self {
            CategoricalColumn::Violation => "violation",
            CategoricalColumn::IsArrested => "is_arrested",
            CategoricalColumn::SearchConducted => "search_conducted",
            CategoricalColumn::DrugsRelatedStop => "drugs_related_stop",
            CategoricalColumn::DriverGender => "driver_gender",
            CategoricalColumn::CountryName => "country_name",
            CategoricalColumn::StopDuration => "stop_duration",
            CategoricalColumn::StopOutcome => "stop_outcome",
            CategoricalColumn::TimeOfDay => "time_of_day",
            CategoricalColumn::AgeCategory => "age_category",
        }
    }
}

/// Observed counts, `counts[row][col]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ContingencyTable {
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    pub counts: Vec<Vec<u64>>,
}

impl ContingencyTable {
    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    /// Drop rows and columns that sum to zero.
    fn pruned(&self) -> ContingencyTable {
        let keep_rows: Vec<usize> = (0..self.counts.len())
            .filter(|&r| self.counts[r].iter().sum::<u64>() > 0)
            .collect();
        let keep_cols: Vec<usize> = (0..self.col_labels.len())
            .filter(|&c| self.counts.iter().map(|row| row[c]).sum::<u64>() > 0)
            .collect();

        ContingencyTable {
            row_labels: keep_rows.iter().map(|&r| self.row_labels[r].clone()).collect(),
            col_labels: keep_cols.iter().map(|&c| self.col_labels[c].clone()).collect(),
            counts: keep_rows
                .iter()
                .map(|&r| keep_cols.iter().map(|&c| self.counts[r][c]).collect())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChiSquareResult {
    pub statistic: f64,
    pub degrees_of_freedom: usize,
    pub p_value: f64,
    /// Effect size in [0, 1]
    pub cramers_v: f64,
    pub is_significant: bool,
}

/// Pearson chi-square test of independence.
pub fn chi_square_independence(table: &ContingencyTable) -> Result<ChiSquareResult, StatsError> {
    let table = table.pruned();
    let rows = table.row_labels.len();
    let cols = table.col_labels.len();
    if rows < 2 || cols < 2 {
        return Err(StatsError::InsufficientData { rows, cols });
    }

    let n = table.total() as f64;
    let row_totals: Vec<f64> = table
        .counts
        .iter()
        .map(|row| row.iter().sum::<u64>() as f64)
        .collect();
    let col_totals: Vec<f64> = (0..cols)
        .map(|c| table.counts.iter().map(|row| row[c]).sum::<u64>() as f64)
        .collect();

    let mut statistic = 0.0;
    for (r, row) in table.counts.iter().enumerate() {
        for (c, &observed) in row.iter().enumerate() {
            let expected = row_totals[r] * col_totals[c] / n;
            statistic += (observed as f64 - expected).powi(2) / expected;
        }
    }

    let dof = (rows - 1) * (cols - 1);
    let dist =
        ChiSquared::new(dof as f64).map_err(|e| StatsError::Distribution(e.to_string()))?;
    let p_value = dist.sf(statistic);
    let cramers_v = (statistic / (n * (rows.min(cols) - 1) as f64)).sqrt();

    Ok(ChiSquareResult {
        statistic,
        degrees_of_freedom: dof,
        p_value,
        cramers_v,
        is_significant: p_value <= SIGNIFICANCE_THRESHOLD,
    })
}

/// Cross-tabulate two columns of `traffic_stops`.
pub fn contingency_table(
    db: &Database,
    rows: CategoricalColumn,
    cols: CategoricalColumn,
) -> Result<ContingencyTable, StatsError> {
    // Both names come from the whitelist above
    let sql = format!(
        "SELECT CAST({r} AS TEXT), CAST({c} AS TEXT), COUNT(*)
         FROM traffic_stops
         GROUP BY {r}, {c}",
        r = rows.column_name(),
        c = cols.column_name()
    );

    let mut stmt = db.connection().prepare(&sql).map_err(StorageError::from)?;
    let cells: Vec<(String, String, i64)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
        .map_err(StorageError::from)?
        .collect::<Result<_, _>>()
        .map_err(StorageError::from)?;

    let row_labels: Vec<String> = cells
        .iter()
        .map(|(r, _, _)| r.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let col_labels: Vec<String> = cells
        .iter()
        .map(|(_, c, _)| c.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut counts = vec![vec![0u64; col_labels.len()]; row_labels.len()];
    for (r, c, n) in &cells {
        let ri = row_labels.binary_search(r).unwrap_or_default();
        let ci = col_labels.binary_search(c).unwrap_or_default();
        counts[ri][ci] = *n as u64;
    }

    debug!(
        rows = row_labels.len(),
        cols = col_labels.len(),
        "built contingency table"
    );
    Ok(ContingencyTable {
        row_labels,
        col_labels,
        counts,
    })
}
