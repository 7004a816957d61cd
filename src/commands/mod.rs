//! CLI command handlers.

mod fetch_file;
mod pins;
mod records;
mod update;

use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use catalog_core::filter::{leading_ids, narrow};
use catalog_core::{ProjectRecord, RecordStore, Settings};
use tracing::{debug, warn};

pub use fetch_file::run_fetch_file_command;
pub use pins::run_pins_command;
pub use records::{run_ip_search_command, run_list_command, run_show_command};
pub use update::run_update_cache_command;

/// Loads the record store, narrowed by ids piped on stdin.
///
/// Input is read only when stdin is not a terminal; an empty pipe narrows
/// the set to nothing.
pub(crate) fn load_active_records(settings: &Settings) -> Result<Vec<ProjectRecord>> {
    let records = RecordStore::new(&settings.store_path).load()?;
    if io::stdin().is_terminal() {
        return Ok(records);
    }

    let ids = leading_ids(io::stdin().lock()).context("Failed to read ids from stdin")?;
    if ids.is_empty() {
        warn!(
            "stdin is not a terminal but held no project ids; no records selected \
             (run from a terminal, or pipe ids in, to choose records)"
        );
    }
    let total = records.len();
    let active = narrow(records, &ids);
    debug!(total, active = active.len(), "narrowed records from stdin");
    Ok(active)
}
