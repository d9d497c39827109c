//! Data module - CSV loading, cleaning and feature derivation

mod cleaner;
mod features;
mod loader;
pub mod record;

pub use cleaner::{
    parse_bool, parse_stop_date, parse_stop_time, standardize_violation, title_case, CleanReport,
    Cleaner, CleanerError, DroppedRow, RowIssue,
};
pub use features::FeatureDeriver;
pub use loader::{DataLoader, LoaderError};
pub use record::{AgeCategory, CleanStop, Gender, StopDuration, StopRecord, TimeOfDay};
