//! `update-cache`: rebuild the document cache and record store.

use anyhow::Result;
use catalog_core::{Settings, rebuild_cache};
use tracing::{info, warn};

use crate::progress::{spawn_progress_ui, stop_progress_ui};

pub async fn run_update_cache_command(
    settings: &Settings,
    limit: Option<usize>,
    use_spinner: bool,
) -> Result<()> {
    let (handle, stop) = spawn_progress_ui(use_spinner, "Rebuilding project cache...");
    let result = rebuild_cache(settings, limit).await;
    stop_progress_ui(handle, &stop).await;
    let report = result?;

    for failure in &report.fetch_failures {
        warn!(url = %failure.url, error = %failure.error, "page not cached");
    }
    for skipped in &report.records.skipped {
        warn!(error = %skipped, "record skipped");
    }

    info!(
        discovered = report.discovered,
        cached = report.cached,
        failed = report.fetch_failures.len(),
        fetch_secs = report.fetch_elapsed.as_secs_f64(),
        records = report.records.saved,
        skipped = report.records.skipped.len(),
        "Cache rebuilt"
    );
    println!(
        "cached {} of {} projects, {} records saved to {}",
        report.cached,
        report.discovered,
        report.records.saved,
        settings.store_path.display()
    );
    Ok(())
}
