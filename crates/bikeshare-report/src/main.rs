mod bootstrap;
mod report;

use anyhow::{anyhow, Result};
use bikeshare_core::models::DateRange;
use bikeshare_core::settings::Settings;
use bikeshare_data::pipeline::RentalPipeline;
use bikeshare_data::reader::locate_dataset_files;

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Bikeshare report v{} starting", env!("CARGO_PKG_VERSION"));

    let data_path = settings
        .data_path
        .clone()
        .or_else(bootstrap::discover_data_path)
        .ok_or_else(|| anyhow!("No data directory found; pass --data-path"))?;
    tracing::info!("Using data directory {}", data_path.display());

    let files = locate_dataset_files(&data_path)?;
    let pipeline = RentalPipeline::load(&files.daily, &files.hourly)?;

    // Default to the full extent of the dataset, the way the dashboard's
    // date picker starts at [min_date, max_date].
    let bounds = pipeline
        .date_bounds()
        .ok_or_else(|| anyhow!("Daily dataset is empty"))?;
    let start = settings.start_date.unwrap_or(bounds.start);
    let end = settings.end_date.unwrap_or(bounds.end);
    let range = DateRange::new(start, end)?;

    tracing::info!("Querying range {}", range);
    let metrics = pipeline.query(&range);

    match settings.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&metrics)?),
        _ => print!("{}", report::render_text(&metrics)),
    }

    Ok(())
}
