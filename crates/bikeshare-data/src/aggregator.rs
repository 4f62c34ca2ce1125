//! Range filtering and grouped aggregation over rental records.
//!
//! Everything here is a pure function over already-labelled records: the
//! reader attaches day-type and time-band labels once at load, and queries
//! filter first, then aggregate. Labels with no matching rows are absent from
//! every result, never zero-filled; consumers distinguish "no data for this
//! category" from "zero usage".

use std::collections::BTreeMap;

use bikeshare_core::models::{DailyRecord, DateRange, DayType, HourlyRecord, TimeBand};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

// ── RangeFilter ───────────────────────────────────────────────────────────────

/// Any record carrying a calendar date.
pub trait Dated {
    /// The record's calendar date.
    fn date(&self) -> NaiveDate;
}

impl Dated for DailyRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for HourlyRecord {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Restrict `records` to those whose date falls inside `range` (both bounds
/// inclusive). An empty result is valid, not an error.
pub fn filter_by_range<'a, T: Dated>(records: &'a [T], range: &DateRange) -> Vec<&'a T> {
    records.iter().filter(|r| range.contains(r.date())).collect()
}

// ── BandStats ─────────────────────────────────────────────────────────────────

/// Aggregated rental figures for one time band.
#[derive(Debug, Clone, Serialize)]
pub struct BandStats {
    /// The band these figures describe.
    pub band: TimeBand,
    /// Sum of rentals across all contributing hourly rows.
    pub total: u64,
    /// Mean rentals per contributing hourly row.
    pub mean: f64,
    /// Number of contributing hourly rows.
    pub hours: u64,
}

// ── RentalAggregator ──────────────────────────────────────────────────────────

/// Stateless helper that groups filtered records by their derived labels.
pub struct RentalAggregator;

impl RentalAggregator {
    /// Sum of `rental_count` per day type.
    pub fn day_type_totals(records: &[&DailyRecord]) -> BTreeMap<DayType, u64> {
        let mut totals: BTreeMap<DayType, u64> = BTreeMap::new();
        for record in records {
            *totals.entry(record.day_type).or_default() += record.rental_count;
        }
        totals
    }

    /// Flat mean of `rental_count` per day type, one stage, row-weighted.
    ///
    /// Not the same thing as [`RentalAggregator::day_type_daily_averages`]:
    /// when a date contributes more than one row, that date weighs more here.
    /// Keep the two operations apart.
    pub fn day_type_flat_means(records: &[&DailyRecord]) -> BTreeMap<DayType, f64> {
        let mut sums: BTreeMap<DayType, (u64, u64)> = BTreeMap::new();
        for record in records {
            let entry = sums.entry(record.day_type).or_default();
            entry.0 += record.rental_count;
            entry.1 += 1;
        }
        sums.into_iter()
            .map(|(day_type, (sum, n))| (day_type, sum as f64 / n as f64))
            .collect()
    }

    /// Two-stage daily average of `rental_count` per day type.
    ///
    /// Stage one collapses each (day type, date) pair to the mean of its rows,
    /// so duplicate same-day rows count once. Stage two averages the per-day
    /// values within each day type, yielding the "typical daily total" for
    /// that category.
    pub fn day_type_daily_averages(records: &[&DailyRecord]) -> BTreeMap<DayType, f64> {
        // Stage 1: (day type, date) → mean of that day's rows.
        let mut per_day: BTreeMap<(DayType, NaiveDate), (u64, u64)> = BTreeMap::new();
        for record in records {
            let entry = per_day.entry((record.day_type, record.date)).or_default();
            entry.0 += record.rental_count;
            entry.1 += 1;
        }

        // Stage 2: day type → mean of its per-day values.
        let mut per_type: BTreeMap<DayType, (f64, u64)> = BTreeMap::new();
        for ((day_type, _date), (sum, n)) in per_day {
            let day_mean = sum as f64 / n as f64;
            let entry = per_type.entry(day_type).or_default();
            entry.0 += day_mean;
            entry.1 += 1;
        }

        per_type
            .into_iter()
            .map(|(day_type, (sum, days))| (day_type, sum / days as f64))
            .collect()
    }

    /// Per-band sum, mean and row count over hourly records, in canonical band
    /// order. Bands with no contributing rows are absent. Unclassified rows
    /// (out-of-range hours) are excluded.
    pub fn band_distribution(records: &[&HourlyRecord]) -> Vec<BandStats> {
        let mut sums: BTreeMap<TimeBand, (u64, u64)> = BTreeMap::new();
        let mut skipped = 0u64;
        for record in records {
            match record.band {
                Some(band) => {
                    let entry = sums.entry(band).or_default();
                    entry.0 += record.rental_count;
                    entry.1 += 1;
                }
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            debug!("band_distribution: {} unclassified rows excluded", skipped);
        }

        // BTreeMap iterates in TimeBand's declaration order, which is the
        // canonical band order.
        sums.into_iter()
            .map(|(band, (total, hours))| BandStats {
                band,
                total,
                mean: total as f64 / hours as f64,
                hours,
            })
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
