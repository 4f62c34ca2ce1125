use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// All errors produced by the bikeshare insight pipeline.
#[derive(Error, Debug)]
pub enum InsightError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A CSV document could not be parsed.
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A date string did not match any recognised calendar-date format.
    #[error("Invalid date format: {0}")]
    DateParse(String),

    /// A weekday value outside 0–6 was found at load time.
    ///
    /// Misclassified day types silently corrupt every day-type statistic, so
    /// loading fails fast instead of guessing a label.
    #[error("Invalid weekday {value} on line {line} (expected 0-6)")]
    InvalidWeekday { line: u64, value: i64 },

    /// A query range with `start > end`.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// The expected data directory does not exist.
    #[error("Data path not found: {0}")]
    DataPathNotFound(PathBuf),

    /// The daily or hourly CSV file could not be located under the directory.
    #[error("No {kind} CSV file found in {path}")]
    NoDataFiles { kind: &'static str, path: PathBuf },

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the insight crates.
pub type Result<T> = std::result::Result<T, InsightError>;
