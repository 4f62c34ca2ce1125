//! CSV file discovery and loading for the bikeshare insight pipeline.
//!
//! Reads the daily and hourly rental datasets exported by the bike-share
//! system and converts them into [`DailyRecord`] / [`HourlyRecord`] structs
//! with their derived labels attached.

use std::path::{Path, PathBuf};

use bikeshare_core::error::{InsightError, Result};
use bikeshare_core::models::{DailyRecord, HourlyRecord};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::{debug, warn};

// ── Discovery ─────────────────────────────────────────────────────────────────

/// Find all `.csv` files recursively under `data_path`, sorted by path.
pub fn find_csv_files(data_path: &Path) -> Vec<PathBuf> {
    if !data_path.exists() {
        warn!("Data path does not exist: {}", data_path.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(data_path)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext == "csv")
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// The pair of CSV files that make up one dataset export.
#[derive(Debug, Clone)]
pub struct DatasetFiles {
    /// One row per calendar day.
    pub daily: PathBuf,
    /// One row per (date, hour) pair.
    pub hourly: PathBuf,
}

/// Locate the daily and hourly CSV files under `data_path` by file stem:
/// the hourly file contains `"hour"`, the daily file contains `"day"`.
pub fn locate_dataset_files(data_path: &Path) -> Result<DatasetFiles> {
    if !data_path.exists() {
        return Err(InsightError::DataPathNotFound(data_path.to_path_buf()));
    }

    let files = find_csv_files(data_path);

    let stem_contains = |path: &PathBuf, needle: &str| {
        path.file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase().contains(needle))
            .unwrap_or(false)
    };

    let hourly = files
        .iter()
        .find(|p| stem_contains(p, "hour"))
        .cloned()
        .ok_or_else(|| InsightError::NoDataFiles {
            kind: "hourly",
            path: data_path.to_path_buf(),
        })?;

    let daily = files
        .iter()
        .filter(|p| **p != hourly)
        .find(|p| stem_contains(p, "day"))
        .cloned()
        .ok_or_else(|| InsightError::NoDataFiles {
            kind: "daily",
            path: data_path.to_path_buf(),
        })?;

    Ok(DatasetFiles { daily, hourly })
}

// ── Raw rows ──────────────────────────────────────────────────────────────────

// Header-based serde rows. The upstream export carries many more columns
// (season, weathersit, temp, ...) which serde ignores.

#[derive(Debug, Deserialize)]
struct RawDailyRow {
    dteday: String,
    holiday: u8,
    weekday: i64,
    casual: u64,
    registered: u64,
    cnt: u64,
}

#[derive(Debug, Deserialize)]
struct RawHourlyRow {
    dteday: String,
    hr: i64,
    cnt: u64,
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Load the daily dataset, attaching day-type labels eagerly.
///
/// Weekday values outside 0–6 fail the whole load with the offending line
/// number: a misclassified day corrupts every day-type statistic downstream.
/// Records are returned sorted by date.
pub fn load_daily_records(path: &Path) -> Result<Vec<DailyRecord>> {
    let file = std::fs::File::open(path).map_err(|source| InsightError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);

    let mut records: Vec<DailyRecord> = Vec::new();
    for (index, row) in reader.deserialize::<RawDailyRow>().enumerate() {
        let row = row?;
        // Header occupies line 1, the first data row is line 2.
        let line = index as u64 + 2;

        if !(0..=6).contains(&row.weekday) {
            return Err(InsightError::InvalidWeekday {
                line,
                value: row.weekday,
            });
        }

        records.push(DailyRecord::new(
            parse_record_date(&row.dteday)?,
            row.holiday != 0,
            row.weekday as u8,
            row.cnt,
            row.casual,
            row.registered,
        ));
    }

    records.sort_by_key(|r| r.date);
    debug!("Loaded {} daily records from {}", records.len(), path.display());
    Ok(records)
}

/// Load the hourly dataset, attaching time-band labels eagerly.
///
/// Hours outside [0, 24) are kept with `band = None` so one bad row does not
/// abort aggregation; each such row is logged. Records are returned sorted by
/// (date, hour).
pub fn load_hourly_records(path: &Path) -> Result<Vec<HourlyRecord>> {
    let file = std::fs::File::open(path).map_err(|source| InsightError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);

    let mut records: Vec<HourlyRecord> = Vec::new();
    let mut unclassified = 0u64;
    for row in reader.deserialize::<RawHourlyRow>() {
        let row = row?;
        let date = parse_record_date(&row.dteday)?;

        // Hours that do not even fit a u8 are mapped to 255, which is
        // already outside every band.
        let hour = u8::try_from(row.hr).unwrap_or(u8::MAX);
        let record = HourlyRecord::new(date, hour, row.cnt);
        if record.band.is_none() {
            unclassified += 1;
            warn!("Hour {} on {} has no time band; row kept unclassified", row.hr, date);
        }
        records.push(record);
    }

    records.sort_by_key(|r| (r.date, r.hour));
    debug!(
        "Loaded {} hourly records from {} ({} unclassified)",
        records.len(),
        path.display(),
        unclassified
    );
    Ok(records)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Parse a calendar date that may be stored as a plain date or as a
/// date-with-time value; time-of-day components are truncated so a record at
/// midnight of the range end is still in range.
fn parse_record_date(s: &str) -> Result<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }

    const DATETIME_FMTS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }

    Err(InsightError::DateParse(s.to_string()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
