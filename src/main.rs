//! SecureCheck - Traffic-Stop Ledger
//!
//! Ingests a CSV of traffic stops into SQLite and answers a fixed catalog of
//! analytical questions from the command line or a dashboard window.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use eframe::egui;
use securecheck::config::AppConfig;
use securecheck::db::Database;
use securecheck::gui::DashboardApp;
use securecheck::pipeline;
use securecheck::queries::{search_logs, AnalyticsQuery, QueryParams, QueryResult};
use securecheck::stats::{chi_square_independence, contingency_table, CategoricalColumn};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// SecureCheck traffic-stop ledger
#[derive(Parser)]
#[command(name = "securecheck")]
#[command(about = "Clean, store and analyze traffic-stop records")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ./securecheck.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file, overrides the configured path
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean a CSV of stops and load it into the database
    Ingest {
        /// CSV file to load, overrides the configured path
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Drop and recreate the table instead of appending
        #[arg(long)]
        replace: bool,
    },

    /// Run one entry of the analytics catalog
    Query {
        #[arg(value_enum)]
        query: AnalyticsQuery,

        /// Row cap for ranking queries
        #[arg(short, long, default_value = "10")]
        limit: u32,

        /// Leave out groups with fewer stops
        #[arg(long, default_value = "1")]
        min_stops: u32,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Also write the result to a file (CSV, or JSON with --json)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Show the latest stops, optionally filtered by country or vehicle number
    Search {
        term: Option<String>,

        #[arg(short, long, default_value = "50")]
        limit: u32,
    },

    /// Chi-square test of independence between two columns
    ChiSquare {
        #[arg(long, value_enum, default_value = "violation")]
        rows: CategoricalColumn,

        #[arg(long, value_enum, default_value = "is-arrested")]
        cols: CategoricalColumn,
    },

    /// Open the dashboard window
    Dashboard,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let db_path = cli.db.unwrap_or_else(|| config.database.path.clone());

    match cli.command.unwrap_or(Commands::Dashboard) {
        Commands::Ingest { csv, replace } => {
            let csv_path = csv.unwrap_or_else(|| config.input.csv_path.clone());
            let summary = pipeline::ingest_to_path(&csv_path, &db_path, &config, replace)?;

            println!(
                "Loaded {} of {} rows into {} ({} dropped, {} cells imputed, {} rows in table)",
                summary.rows_persisted,
                summary.rows_read,
                db_path.display(),
                summary.dropped.len(),
                summary.imputed_cells,
                summary.table_rows
            );
            for dropped in summary.dropped.iter().take(10) {
                println!("  skipped row {}: {}", dropped.row + 1, dropped.reason);
            }
            if summary.dropped.len() > 10 {
                println!("  ... and {} more", summary.dropped.len() - 10);
            }
        }
        Commands::Query {
            query,
            limit,
            min_stops,
            json,
            out,
        } => {
            let db = open_existing(&db_path)?;
            let params = QueryParams { limit, min_stops };
            let result = query
                .run(&db, &params)
                .with_context(|| format!("Query '{}' failed", query.title()))?;

            if json {
                println!("{}", result.to_json()?);
            } else {
                print_table(&result);
            }

            if let Some(out) = out {
                if json {
                    result.write_json(&out)?;
                } else {
                    result.write_csv(&out)?;
                }
                info!(path = %out.display(), "result written");
            }
        }
        Commands::Search { term, limit } => {
            let db = open_existing(&db_path)?;
            let result = search_logs(&db, term.as_deref(), limit).context("Log search failed")?;
            print_table(&result);
        }
        Commands::ChiSquare { rows, cols } => {
            let db = open_existing(&db_path)?;
            let table = contingency_table(&db, rows, cols)?;
            let test = chi_square_independence(&table)?;

            println!(
                "{} vs {}: n = {}",
                rows.column_name(),
                cols.column_name(),
                table.total()
            );
            println!(
                "chi2 = {:.4}  dof = {}  p = {:.4}  Cramer's V = {:.4}",
                test.statistic, test.degrees_of_freedom, test.p_value, test.cramers_v
            );
            println!(
                "{}",
                if test.is_significant {
                    "Significant at 0.05: the columns are not independent"
                } else {
                    "Not significant at 0.05"
                }
            );
        }
        Commands::Dashboard => {
            // A fresh file is fine here; the window offers CSV import
            let db = Database::open(&db_path).with_context(|| {
                format!("Database connection error for '{}'", db_path.display())
            })?;

            // Configure native options
            let options = eframe::NativeOptions {
                viewport: egui::ViewportBuilder::default()
                    .with_inner_size([1400.0, 900.0])
                    .with_min_inner_size([1100.0, 700.0])
                    .with_title("SecureCheck Police Dashboard"),
                ..Default::default()
            };

            eframe::run_native(
                "SecureCheck",
                options,
                Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, db, config)))),
            )
            .map_err(|e| anyhow!("Dashboard failed: {}", e))?;
        }
    }

    Ok(())
}

fn open_existing(path: &std::path::Path) -> Result<Database> {
    Database::open_existing(path).with_context(|| {
        format!(
            "No ledger at '{}'; run `securecheck ingest` first",
            path.display()
        )
    })
}

/// Plain-text table with columns padded to their widest cell.
fn print_table(result: &QueryResult) {
    println!("{}", result.title);
    if result.is_empty() {
        println!("(no rows)");
        return;
    }

    let cells: Vec<Vec<String>> = result
        .rows
        .iter()
        .map(|row| row.iter().map(|c| c.to_string()).collect())
        .collect();
    let widths: Vec<usize> = result
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .filter_map(|row| row.get(i))
                .map(|c| c.chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or_default()
        })
        .collect();

    let line = |values: Vec<&str>| {
        values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<width$}", v, width = *w))
            .collect::<Vec<_>>()
            .join("  ")
    };

    println!("{}", line(result.columns.iter().map(String::as_str).collect()));
    println!(
        "{}",
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  ")
    );
    for row in &cells {
        println!("{}", line(row.iter().map(String::as_str).collect()));
    }
}
