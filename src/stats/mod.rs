//! Stats module - exploratory tests over the stored stops

mod chi_square;

pub use chi_square::{
    chi_square_independence, contingency_table, CategoricalColumn, ChiSquareResult,
    ContingencyTable, StatsError, SIGNIFICANCE_THRESHOLD,
};
