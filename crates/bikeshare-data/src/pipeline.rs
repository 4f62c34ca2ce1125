//! Query pipeline for the bikeshare insight tool.
//!
//! Owns the two datasets (labels attached at load) and answers per-range
//! queries with the statistic sets the presentation layer needs. One
//! [`RentalPipeline`] is built per process; each query is a single
//! filter-then-aggregate pass with no shared mutable state.

use std::collections::BTreeMap;
use std::path::Path;

use bikeshare_core::error::Result;
use bikeshare_core::models::{DailyRecord, DateRange, DayType, HourlyRecord, TimeBand};
use chrono::Utc;
use tracing::info;

use crate::aggregator::{filter_by_range, BandStats, RentalAggregator};
use crate::reader::{load_daily_records, load_hourly_records};

// ── Public types ──────────────────────────────────────────────────────────────

/// Rental totals over the daily records in range.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct RentalTotals {
    /// Sum of all rentals.
    pub rentals: u64,
    /// Sum of rentals by casual users.
    pub casual: u64,
    /// Sum of rentals by registered users.
    pub registered: u64,
}

/// Metadata produced alongside a query result.
#[derive(Debug, Clone, serde::Serialize)]
pub struct QueryMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    /// Daily rows that fell inside the range.
    pub daily_rows_in_range: usize,
    /// Hourly rows that fell inside the range.
    pub hourly_rows_in_range: usize,
}

/// The complete output of [`RentalPipeline::query`] for one date range.
///
/// Categories and bands with no data in the range are absent from the maps
/// and the distribution; all lookups return `Option` so callers render a
/// placeholder instead of failing.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RangeMetrics {
    /// The range this result describes.
    pub range: DateRange,
    /// Rental / casual / registered sums.
    pub totals: RentalTotals,
    /// Two-stage daily average per day type.
    pub day_type_averages: BTreeMap<DayType, f64>,
    /// Per-band sum, mean and row count, canonical band order.
    pub band_distribution: Vec<BandStats>,
    /// Metadata about this query.
    pub metadata: QueryMetadata,
}

impl RangeMetrics {
    /// Average daily rentals for `day_type`, or `None` when the range holds
    /// no such days.
    pub fn day_type_average(&self, day_type: DayType) -> Option<f64> {
        self.day_type_averages.get(&day_type).copied()
    }

    /// Full band statistics for `band`, or `None` when the range holds no
    /// rows in that band.
    pub fn band_stats(&self, band: TimeBand) -> Option<&BandStats> {
        self.band_distribution.iter().find(|s| s.band == band)
    }

    /// Mean rentals per hourly row for `band`, or `None` when absent.
    pub fn band_average(&self, band: TimeBand) -> Option<f64> {
        self.band_stats(band).map(|s| s.mean)
    }

    /// Per-band means in canonical band order (bands present in range only).
    pub fn band_averages(&self) -> Vec<(TimeBand, f64)> {
        self.band_distribution.iter().map(|s| (s.band, s.mean)).collect()
    }
}

// ── RentalPipeline ────────────────────────────────────────────────────────────

/// The classification-and-aggregation pipeline.
///
/// Datasets are loaded once, labelled once, and read-only afterwards; the
/// derived labels do not depend on any query range, so repeated queries reuse
/// them.
pub struct RentalPipeline {
    daily: Vec<DailyRecord>,
    hourly: Vec<HourlyRecord>,
}

impl RentalPipeline {
    /// Build a pipeline from already-labelled records.
    pub fn from_records(daily: Vec<DailyRecord>, hourly: Vec<HourlyRecord>) -> Self {
        Self { daily, hourly }
    }

    /// Load both CSV files and build the pipeline.
    pub fn load(daily_path: &Path, hourly_path: &Path) -> Result<Self> {
        let daily = load_daily_records(daily_path)?;
        let hourly = load_hourly_records(hourly_path)?;
        info!(
            "Pipeline ready: {} daily rows, {} hourly rows",
            daily.len(),
            hourly.len()
        );
        Ok(Self::from_records(daily, hourly))
    }

    /// The daily records owned by the pipeline.
    pub fn daily(&self) -> &[DailyRecord] {
        &self.daily
    }

    /// The hourly records owned by the pipeline.
    pub fn hourly(&self) -> &[HourlyRecord] {
        &self.hourly
    }

    /// Earliest and latest daily date, or `None` for an empty dataset.
    /// These are the natural defaults for a caller-supplied range.
    pub fn date_bounds(&self) -> Option<DateRange> {
        let min = self.daily.iter().map(|r| r.date).min()?;
        let max = self.daily.iter().map(|r| r.date).max()?;
        // min <= max by construction.
        Some(DateRange { start: min, end: max })
    }

    /// Compute the statistic sets for `range` in one pass:
    /// filter both datasets, then aggregate the filtered rows.
    pub fn query(&self, range: &DateRange) -> RangeMetrics {
        let daily = filter_by_range(&self.daily, range);
        let hourly = filter_by_range(&self.hourly, range);

        let mut totals = RentalTotals::default();
        for record in &daily {
            totals.rentals += record.rental_count;
            totals.casual += record.casual_count;
            totals.registered += record.registered_count;
        }

        let day_type_averages = RentalAggregator::day_type_daily_averages(&daily);
        let band_distribution = RentalAggregator::band_distribution(&hourly);

        let metadata = QueryMetadata {
            generated_at: Utc::now().to_rfc3339(),
            daily_rows_in_range: daily.len(),
            hourly_rows_in_range: hourly.len(),
        };

        RangeMetrics {
            range: *range,
            totals,
            day_type_averages,
            band_distribution,
            metadata,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn daily(d: u32, is_holiday: bool, weekday: u8, cnt: u64, casual: u64) -> DailyRecord {
        DailyRecord::new(date(2011, 1, d), is_holiday, weekday, cnt, casual, cnt - casual)
    }

    fn hourly(d: u32, hour: u8, cnt: u64) -> HourlyRecord {
        HourlyRecord::new(date(2011, 1, d), hour, cnt)
    }

    /// The three-row daily scenario: a holiday, a Saturday, a Sunday.
    fn sample_pipeline() -> RentalPipeline {
        RentalPipeline::from_records(
            vec![
                daily(1, true, 5, 500, 100),
                daily(2, false, 6, 300, 60),
                daily(3, false, 0, 0, 0),
            ],
            vec![hourly(1, 5, 10), hourly(1, 6, 20), hourly(2, 18, 30), hourly(3, 20, 40)],
        )
    }

    fn full_range() -> DateRange {
        DateRange::new(date(2011, 1, 1), date(2011, 1, 3)).unwrap()
    }

    // ── query: totals ─────────────────────────────────────────────────────────

    #[test]
    fn test_query_totals() {
        let metrics = sample_pipeline().query(&full_range());

        assert_eq!(metrics.totals.rentals, 800);
        assert_eq!(metrics.totals.casual, 160);
        assert_eq!(metrics.totals.registered, 640);
    }

    // ── query: day-type averages ──────────────────────────────────────────────

    #[test]
    fn test_query_day_type_averages_and_absence() {
        let metrics = sample_pipeline().query(&full_range());

        assert!((metrics.day_type_average(DayType::Holiday).unwrap() - 500.0).abs() < 1e-9);
        // Two weekend days with totals 300 and 0 → 150.
        assert!((metrics.day_type_average(DayType::Weekend).unwrap() - 150.0).abs() < 1e-9);
        // No workday in range: absent, not zero.
        assert_eq!(metrics.day_type_average(DayType::Workday), None);
    }

    // ── query: band distribution ──────────────────────────────────────────────

    #[test]
    fn test_query_band_sums_and_absence() {
        let metrics = sample_pipeline().query(&full_range());

        let sums: Vec<(TimeBand, u64)> = metrics
            .band_distribution
            .iter()
            .map(|s| (s.band, s.total))
            .collect();
        assert_eq!(
            sums,
            vec![
                (TimeBand::DiniHari, 10),
                (TimeBand::Pagi, 20),
                (TimeBand::Sore, 30),
                (TimeBand::Malam, 40),
            ]
        );
        assert_eq!(metrics.band_average(TimeBand::Siang), None);
        assert!(metrics.band_stats(TimeBand::Siang).is_none());
    }

    #[test]
    fn test_query_band_averages_in_canonical_order() {
        let metrics = sample_pipeline().query(&full_range());

        let bands: Vec<TimeBand> = metrics.band_averages().iter().map(|(b, _)| *b).collect();
        assert_eq!(
            bands,
            vec![TimeBand::DiniHari, TimeBand::Pagi, TimeBand::Sore, TimeBand::Malam]
        );
    }

    // ── query: narrowing the range changes the answer ─────────────────────────

    #[test]
    fn test_query_filters_before_aggregating() {
        let pipeline = sample_pipeline();
        let narrow = DateRange::new(date(2011, 1, 2), date(2011, 1, 3)).unwrap();
        let metrics = pipeline.query(&narrow);

        assert_eq!(metrics.totals.rentals, 300);
        assert_eq!(metrics.day_type_average(DayType::Holiday), None);
        assert!((metrics.day_type_average(DayType::Weekend).unwrap() - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_query_empty_range_yields_empty_mappings() {
        let pipeline = sample_pipeline();
        let outside = DateRange::new(date(2011, 2, 1), date(2011, 2, 28)).unwrap();
        let metrics = pipeline.query(&outside);

        assert_eq!(metrics.totals.rentals, 0);
        assert!(metrics.day_type_averages.is_empty());
        assert!(metrics.band_distribution.is_empty());
        assert_eq!(metrics.metadata.daily_rows_in_range, 0);
        assert_eq!(metrics.metadata.hourly_rows_in_range, 0);
    }

    // ── query: metadata ───────────────────────────────────────────────────────

    #[test]
    fn test_query_metadata_row_counts() {
        let metrics = sample_pipeline().query(&full_range());

        assert_eq!(metrics.metadata.daily_rows_in_range, 3);
        assert_eq!(metrics.metadata.hourly_rows_in_range, 4);
        assert!(!metrics.metadata.generated_at.is_empty());
    }

    // ── date_bounds ───────────────────────────────────────────────────────────

    #[test]
    fn test_date_bounds() {
        let bounds = sample_pipeline().date_bounds().unwrap();
        assert_eq!(bounds.start, date(2011, 1, 1));
        assert_eq!(bounds.end, date(2011, 1, 3));
    }

    #[test]
    fn test_date_bounds_empty_dataset() {
        let pipeline = RentalPipeline::from_records(vec![], vec![]);
        assert!(pipeline.date_bounds().is_none());
    }

    // ── query result is serializable ──────────────────────────────────────────

    #[test]
    fn test_metrics_serialize_to_json_with_display_labels() {
        let metrics = sample_pipeline().query(&full_range());
        let json = serde_json::to_value(&metrics).unwrap();

        assert_eq!(json["totals"]["rentals"], 800);
        assert!(json["day_type_averages"]["Holiday"].is_number());
        assert_eq!(json["band_distribution"][0]["band"], "Dini Hari");
    }

    // ── load ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_load_from_csv_files() {
        let tmp = TempDir::new().unwrap();
        let daily_path = tmp.path().join("day_data.csv");
        let hourly_path = tmp.path().join("hour_data.csv");

        let mut f = std::fs::File::create(&daily_path).unwrap();
        writeln!(f, "instant,dteday,holiday,weekday,workingday,casual,registered,cnt").unwrap();
        writeln!(f, "1,2011-01-01,1,5,0,100,400,500").unwrap();
        writeln!(f, "2,2011-01-02,0,6,0,60,240,300").unwrap();

        let mut f = std::fs::File::create(&hourly_path).unwrap();
        writeln!(f, "instant,dteday,hr,holiday,weekday,casual,registered,cnt").unwrap();
        writeln!(f, "1,2011-01-01,8,1,5,2,8,10").unwrap();

        let pipeline = RentalPipeline::load(&daily_path, &hourly_path).unwrap();
        assert_eq!(pipeline.daily().len(), 2);
        assert_eq!(pipeline.hourly().len(), 1);

        let range = pipeline.date_bounds().unwrap();
        let metrics = pipeline.query(&range);
        assert_eq!(metrics.totals.rentals, 800);
    }
}
