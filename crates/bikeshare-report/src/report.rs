//! Plain-text rendering of a query result.
//!
//! Every category and band slot is always printed; absent entries render the
//! `no data` placeholder instead of a number, so a range with no holidays
//! (for example) still produces a complete report.

use bikeshare_core::formatting::{format_number, percentage};
use bikeshare_core::models::{DayType, TimeBand};
use bikeshare_data::pipeline::RangeMetrics;

const NO_DATA: &str = "no data";

/// Render the full sectioned text report for one query.
pub fn render_text(metrics: &RangeMetrics) -> String {
    let mut out = String::new();

    out.push_str("Bicycle Rental Report\n");
    out.push_str(&format!("Range: {}\n", metrics.range));
    out.push_str(&format!(
        "Rows in range: {} daily, {} hourly\n\n",
        metrics.metadata.daily_rows_in_range, metrics.metadata.hourly_rows_in_range
    ));

    render_totals(metrics, &mut out);
    render_day_type_averages(metrics, &mut out);
    render_band_table(metrics, &mut out);

    out
}

// ── Sections ──────────────────────────────────────────────────────────────────

fn render_totals(metrics: &RangeMetrics, out: &mut String) {
    let totals = &metrics.totals;
    let rentals = totals.rentals as f64;

    out.push_str("Totals\n");
    out.push_str(&format!(
        "  Rentals:    {}\n",
        format_number(rentals, 0)
    ));
    out.push_str(&format!(
        "  Casual:     {} ({}%)\n",
        format_number(totals.casual as f64, 0),
        percentage(totals.casual as f64, rentals, 1)
    ));
    out.push_str(&format!(
        "  Registered: {} ({}%)\n\n",
        format_number(totals.registered as f64, 0),
        percentage(totals.registered as f64, rentals, 1)
    ));
}

fn render_day_type_averages(metrics: &RangeMetrics, out: &mut String) {
    out.push_str("Average daily rentals by day type\n");
    for day_type in DayType::ALL {
        let value = match metrics.day_type_average(day_type) {
            Some(avg) => format_number(avg, 1),
            None => NO_DATA.to_string(),
        };
        out.push_str(&format!("  {:<8} {}\n", day_type.label(), value));
    }
    out.push('\n');
}

fn render_band_table(metrics: &RangeMetrics, out: &mut String) {
    out.push_str("Rentals by time band\n");
    out.push_str(&format!(
        "  {:<10} {:>12} {:>12} {:>8}\n",
        "Band", "Total", "Avg/hour", "Hours"
    ));
    for band in TimeBand::ALL {
        match metrics.band_stats(band) {
            Some(stats) => out.push_str(&format!(
                "  {:<10} {:>12} {:>12} {:>8}\n",
                band.label(),
                format_number(stats.total as f64, 0),
                format_number(stats.mean, 1),
                format_number(stats.hours as f64, 0),
            )),
            None => out.push_str(&format!("  {:<10} {:>12}\n", band.label(), NO_DATA)),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
