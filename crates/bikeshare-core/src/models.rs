use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{InsightError, Result};

// ── DayType ───────────────────────────────────────────────────────────────────

/// Classification of a calendar day.
///
/// Declared in display order; the derived [`Ord`] gives the canonical ordering
/// used everywhere downstream (maps, reports).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DayType {
    /// A public holiday, regardless of the day of the week.
    Holiday,
    /// A non-holiday Saturday or Sunday (weekday 0 or 6 in the source scheme).
    Weekend,
    /// Any other day.
    Workday,
}

impl DayType {
    /// All day types in canonical order.
    pub const ALL: [DayType; 3] = [DayType::Holiday, DayType::Weekend, DayType::Workday];

    /// Classify a day from its holiday flag and weekday number.
    ///
    /// Precedence is fixed: the holiday flag wins, then weekday 0 or 6 is a
    /// weekend, everything else is a workday. Every input maps to exactly one
    /// label; weekday values outside 0–6 are rejected at load time by the
    /// reader, not here.
    pub fn classify(is_holiday: bool, weekday: u8) -> DayType {
        if is_holiday {
            DayType::Holiday
        } else if weekday == 0 || weekday == 6 {
            DayType::Weekend
        } else {
            DayType::Workday
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            DayType::Holiday => "Holiday",
            DayType::Weekend => "Weekend",
            DayType::Workday => "Workday",
        }
    }
}

impl std::fmt::Display for DayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ── TimeBand ──────────────────────────────────────────────────────────────────

/// One of the five fixed hour-of-day bands.
///
/// The bands partition [0, 24) into left-inclusive, right-exclusive intervals
/// with boundaries `[0, 6, 12, 16, 19, 24)`. Declaration order is the
/// canonical band order, so the derived [`Ord`] sorts bands by hour of day.
/// The display labels are the Indonesian names carried from the source data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimeBand {
    /// Early morning, hours [0, 6).
    #[serde(rename = "Dini Hari")]
    DiniHari,
    /// Morning, hours [6, 12).
    Pagi,
    /// Midday, hours [12, 16).
    Siang,
    /// Late afternoon, hours [16, 19).
    Sore,
    /// Evening, hours [19, 24).
    Malam,
}

impl TimeBand {
    /// All bands in canonical order.
    pub const ALL: [TimeBand; 5] = [
        TimeBand::DiniHari,
        TimeBand::Pagi,
        TimeBand::Siang,
        TimeBand::Sore,
        TimeBand::Malam,
    ];

    /// Upper boundaries (exclusive) of each band, in canonical order.
    const UPPER_BOUNDS: [u8; 5] = [6, 12, 16, 19, 24];

    /// Find the band whose half-open interval contains `hour`.
    ///
    /// Scans the fixed boundaries in order and returns the first matching
    /// interval. Hours outside [0, 24) have no band and return `None`; the
    /// caller keeps the row but excludes it from band aggregation.
    pub fn from_hour(hour: u8) -> Option<TimeBand> {
        Self::ALL
            .iter()
            .zip(Self::UPPER_BOUNDS.iter())
            .find(|(_, &upper)| hour < upper)
            .map(|(&band, _)| band)
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            TimeBand::DiniHari => "Dini Hari",
            TimeBand::Pagi => "Pagi",
            TimeBand::Siang => "Siang",
            TimeBand::Sore => "Sore",
            TimeBand::Malam => "Malam",
        }
    }
}

impl std::fmt::Display for TimeBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ── Records ───────────────────────────────────────────────────────────────────

/// One row of the daily rentals dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyRecord {
    /// Calendar date of the observation.
    pub date: NaiveDate,
    /// Whether this date is a public holiday.
    pub is_holiday: bool,
    /// Weekday number in the source scheme (0–6, where 0 and 6 are weekend).
    pub weekday: u8,
    /// Total rentals on this date.
    pub rental_count: u64,
    /// Rentals by casual (unregistered) users.
    pub casual_count: u64,
    /// Rentals by registered users.
    pub registered_count: u64,
    /// Derived day-type label, computed once at load and immutable after.
    pub day_type: DayType,
}

impl DailyRecord {
    /// Build a record with its day-type label attached.
    pub fn new(
        date: NaiveDate,
        is_holiday: bool,
        weekday: u8,
        rental_count: u64,
        casual_count: u64,
        registered_count: u64,
    ) -> Self {
        Self {
            date,
            is_holiday,
            weekday,
            rental_count,
            casual_count,
            registered_count,
            day_type: DayType::classify(is_holiday, weekday),
        }
    }
}

/// One row of the hourly rentals dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourlyRecord {
    /// Calendar date of the observation.
    pub date: NaiveDate,
    /// Hour of day, 0–23 for well-formed input.
    pub hour: u8,
    /// Rentals during this hour.
    pub rental_count: u64,
    /// Derived time-band label; `None` marks an out-of-range hour whose row
    /// is kept but excluded from band aggregation.
    pub band: Option<TimeBand>,
}

impl HourlyRecord {
    /// Build a record with its time-band label attached.
    pub fn new(date: NaiveDate, hour: u8, rental_count: u64) -> Self {
        Self {
            date,
            hour,
            rental_count,
            band: TimeBand::from_hour(hour),
        }
    }
}

// ── DateRange ─────────────────────────────────────────────────────────────────

/// An inclusive calendar-date window used to filter records before
/// aggregation. One per query; never persisted with the datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First date in the window (inclusive).
    pub start: NaiveDate,
    /// Last date in the window (inclusive).
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(InsightError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Whether `date` falls inside the window (both bounds inclusive).
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ── DayType::classify ─────────────────────────────────────────────────────

    #[test]
    fn test_classify_holiday_wins_over_weekday() {
        // A holiday on a Saturday is still a holiday.
        assert_eq!(DayType::classify(true, 6), DayType::Holiday);
        assert_eq!(DayType::classify(true, 3), DayType::Holiday);
        assert_eq!(DayType::classify(true, 0), DayType::Holiday);
    }

    #[test]
    fn test_classify_weekend_days() {
        assert_eq!(DayType::classify(false, 0), DayType::Weekend);
        assert_eq!(DayType::classify(false, 6), DayType::Weekend);
    }

    #[test]
    fn test_classify_workdays() {
        for weekday in 1..=5 {
            assert_eq!(DayType::classify(false, weekday), DayType::Workday);
        }
    }

    #[test]
    fn test_day_type_canonical_order() {
        let mut types = vec![DayType::Workday, DayType::Holiday, DayType::Weekend];
        types.sort();
        assert_eq!(types, DayType::ALL.to_vec());
    }

    #[test]
    fn test_day_type_labels() {
        assert_eq!(DayType::Holiday.label(), "Holiday");
        assert_eq!(DayType::Weekend.label(), "Weekend");
        assert_eq!(DayType::Workday.label(), "Workday");
    }

    // ── TimeBand::from_hour ───────────────────────────────────────────────────

    #[test]
    fn test_from_hour_boundaries() {
        assert_eq!(TimeBand::from_hour(0), Some(TimeBand::DiniHari));
        assert_eq!(TimeBand::from_hour(5), Some(TimeBand::DiniHari));
        assert_eq!(TimeBand::from_hour(6), Some(TimeBand::Pagi));
        assert_eq!(TimeBand::from_hour(11), Some(TimeBand::Pagi));
        assert_eq!(TimeBand::from_hour(12), Some(TimeBand::Siang));
        assert_eq!(TimeBand::from_hour(15), Some(TimeBand::Siang));
        assert_eq!(TimeBand::from_hour(16), Some(TimeBand::Sore));
        assert_eq!(TimeBand::from_hour(18), Some(TimeBand::Sore));
        assert_eq!(TimeBand::from_hour(19), Some(TimeBand::Malam));
        assert_eq!(TimeBand::from_hour(23), Some(TimeBand::Malam));
    }

    #[test]
    fn test_from_hour_partitions_day_with_no_gap_or_overlap() {
        // Every hour of the day maps to exactly one band.
        for hour in 0..24 {
            assert!(TimeBand::from_hour(hour).is_some(), "hour {hour} unmapped");
        }
    }

    #[test]
    fn test_from_hour_out_of_range_is_unclassified() {
        assert_eq!(TimeBand::from_hour(24), None);
        assert_eq!(TimeBand::from_hour(99), None);
    }

    #[test]
    fn test_time_band_canonical_order() {
        let mut bands = vec![
            TimeBand::Malam,
            TimeBand::Siang,
            TimeBand::DiniHari,
            TimeBand::Sore,
            TimeBand::Pagi,
        ];
        bands.sort();
        assert_eq!(bands, TimeBand::ALL.to_vec());
    }

    #[test]
    fn test_time_band_serde_uses_display_labels() {
        let json = serde_json::to_string(&TimeBand::DiniHari).unwrap();
        assert_eq!(json, r#""Dini Hari""#);
        let back: TimeBand = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TimeBand::DiniHari);
    }

    // ── Records ───────────────────────────────────────────────────────────────

    #[test]
    fn test_daily_record_attaches_day_type() {
        let record = DailyRecord::new(date(2011, 1, 1), true, 5, 500, 100, 400);
        assert_eq!(record.day_type, DayType::Holiday);
    }

    #[test]
    fn test_hourly_record_attaches_band() {
        let record = HourlyRecord::new(date(2011, 1, 1), 14, 120);
        assert_eq!(record.band, Some(TimeBand::Siang));
    }

    #[test]
    fn test_hourly_record_bad_hour_is_unclassified() {
        let record = HourlyRecord::new(date(2011, 1, 1), 25, 10);
        assert_eq!(record.band, None);
    }

    // ── DateRange ─────────────────────────────────────────────────────────────

    #[test]
    fn test_date_range_contains_is_inclusive() {
        let range = DateRange::new(date(2011, 1, 2), date(2011, 1, 5)).unwrap();
        assert!(!range.contains(date(2011, 1, 1)));
        assert!(range.contains(date(2011, 1, 2)));
        assert!(range.contains(date(2011, 1, 4)));
        assert!(range.contains(date(2011, 1, 5)));
        assert!(!range.contains(date(2011, 1, 6)));
    }

    #[test]
    fn test_date_range_single_day() {
        let range = DateRange::new(date(2011, 1, 3), date(2011, 1, 3)).unwrap();
        assert!(range.contains(date(2011, 1, 3)));
        assert!(!range.contains(date(2011, 1, 4)));
    }

    #[test]
    fn test_date_range_rejects_reversed_bounds() {
        let err = DateRange::new(date(2011, 1, 5), date(2011, 1, 2)).unwrap_err();
        assert!(err.to_string().contains("2011-01-05"));
    }
}
