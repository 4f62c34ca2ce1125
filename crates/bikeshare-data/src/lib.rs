//! Data layer for the bikeshare insight pipeline.
//!
//! Responsible for discovering and reading the daily and hourly CSV exports,
//! filtering records to a date range, computing grouped statistics and
//! answering per-range queries.

pub mod aggregator;
pub mod pipeline;
pub mod reader;

pub use bikeshare_core as core;
