//! SecureCheck - Traffic-Stop Ledger
//!
//! Cleans a CSV of traffic stops, loads it into SQLite, and answers a fixed
//! set of analytical questions from the command line or a dashboard window.

pub mod charts;
pub mod config;
pub mod data;
pub mod db;
pub mod gui;
pub mod pipeline;
pub mod queries;
pub mod stats;

#[cfg(test)]
mod testutil;
