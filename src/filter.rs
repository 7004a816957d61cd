//! Narrowing the active record set from piped input.
//!
//! When standard input is not a terminal, each line is scanned for a
//! leading integer; only records with one of those ids stay active. This
//! lets one invocation's `list` output feed another's `pins` or `show`.

use std::collections::HashSet;
use std::io::BufRead;

use tracing::debug;

use crate::record::ProjectRecord;

/// Leading integer token of `line`, if it has one.
///
/// ```
/// use catalog_core::filter::leading_id;
///
/// assert_eq!(leading_id("  1234  caravel  MPW-5"), Some("1234"));
/// assert_eq!(leading_id("x 1234"), None);
/// ```
#[must_use]
pub fn leading_id(line: &str) -> Option<&str> {
    let token = line.split_whitespace().next()?;
    let digits = token
        .find(|c: char| !c.is_ascii_digit())
        .map_or(token, |end| &token[..end]);
    (!digits.is_empty()).then_some(digits)
}

/// Collects the leading ids of every line in `reader`.
///
/// # Errors
///
/// Returns the underlying IO error if reading fails.
pub fn leading_ids(reader: impl BufRead) -> std::io::Result<HashSet<String>> {
    let mut ids = HashSet::new();
    for line in reader.lines() {
        let line = line?;
        if let Some(id) = leading_id(&line) {
            // Normalize "007" to "7" so it matches stored ids
            let id = id.trim_start_matches('0');
            ids.insert(if id.is_empty() { "0" } else { id }.to_string());
        }
    }
    debug!(count = ids.len(), "ids read from piped input");
    Ok(ids)
}

/// Keeps only records whose id is in `ids`, preserving order.
#[must_use]
pub fn narrow(records: Vec<ProjectRecord>, ids: &HashSet<String>) -> Vec<ProjectRecord> {
    records
        .into_iter()
        .filter(|record| ids.contains(record.id.as_str()))
        .collect()
}
