//! Ingest pipeline: CSV -> clean -> derive -> persist.

use crate::config::AppConfig;
use crate::data::{Cleaner, DataLoader, DroppedRow, FeatureDeriver};
use crate::db::Database;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

/// What one ingest run did.
#[derive(Debug, Clone)]
pub struct IngestSummary {
    pub rows_read: usize,
    pub rows_persisted: usize,
    pub dropped: Vec<DroppedRow>,
    pub imputed_cells: usize,
    /// Rows in the table after the load
    pub table_rows: usize,
}

/// Load `csv_path` into an open database.
///
/// With `replace` the table is recreated first, otherwise rows are appended.
pub fn ingest(
    csv_path: &Path,
    db: &mut Database,
    config: &AppConfig,
    replace: bool,
) -> Result<IngestSummary> {
    let mut loader = DataLoader::new();
    let raw = loader
        .load_csv(csv_path)
        .with_context(|| format!("Dataset file '{}' could not be read", csv_path.display()))?;
    let rows_read = raw.height();

    let report = Cleaner::new(config.cleaning.timestamp_policy)
        .clean(raw)
        .context("Data preprocessing failed")?;
    debug!(columns = ?loader.get_columns(), "raw CSV columns");
    let records = FeatureDeriver::new(config.features).derive_all(report.records);

    let rows_persisted = if replace {
        db.replace_records(&records)
    } else {
        db.insert_records(&records)
    }
    .context("Failed to load stops into the database")?;
    let table_rows = db.count_rows()?;

    info!(
        rows_read,
        rows_persisted,
        dropped = report.dropped.len(),
        table_rows,
        "ingest complete"
    );

    Ok(IngestSummary {
        rows_read,
        rows_persisted,
        dropped: report.dropped,
        imputed_cells: report.imputed_cells,
        table_rows,
    })
}

/// Open the configured database file and ingest into it.
pub fn ingest_to_path(
    csv_path: &Path,
    db_path: &Path,
    config: &AppConfig,
    replace: bool,
) -> Result<IngestSummary> {
    let mut db = Database::open(db_path)
        .with_context(|| format!("Database connection error for '{}'", db_path.display()))?;
    ingest(csv_path, &mut db, config, replace)
}
