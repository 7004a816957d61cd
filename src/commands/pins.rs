//! `pins`: largest macro pin count across the active records.

use anyhow::{Result, bail};
use catalog_core::{GitHubClient, PinCountEngine, Settings};
use tracing::{info, warn};

use super::load_active_records;

pub async fn run_pins_command(settings: &Settings) -> Result<()> {
    let records = load_active_records(settings)?;
    if records.is_empty() {
        info!("No projects selected");
        return Ok(());
    }

    let engine = PinCountEngine::new(GitHubClient::new(settings)?);
    let survey = engine.survey(&records).await;

    if !survey.skipped.is_empty() {
        warn!(skipped = survey.skipped.len(), "some projects could not be checked");
    }
    if let Some(remaining) = engine.files().remaining_quota() {
        info!(remaining, "API requests remaining");
    }

    match survey.max() {
        Some((id, pins)) => println!("max pins {pins} in project {id}"),
        None => println!("no pin counts computed"),
    }

    if let Some(stopped) = survey.stopped {
        bail!(
            "{stopped}; {} of {} projects were not checked",
            survey.unvisited + 1,
            records.len()
        );
    }
    Ok(())
}
