//! Operator-curated list of selected project ids.

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, warn};

use super::StoreError;

/// Reads a newline-delimited list of project ids.
///
/// Blank lines and lines starting with `#` are ignored. A missing file is
/// treated as an empty selection.
///
/// # Errors
///
/// Returns [`StoreError::Io`] if the file exists but cannot be read.
pub fn load_selected_ids(path: &Path) -> Result<HashSet<String>, StoreError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "selected list not found; no projects will be flagged");
            return Ok(HashSet::new());
        }
        Err(e) => return Err(StoreError::io(path, e)),
    };

    let ids: HashSet<String> = parse_selected_ids(&raw);
    debug!(path = %path.display(), count = ids.len(), "loaded selected ids");
    Ok(ids)
}

fn parse_selected_ids(raw: &str) -> HashSet<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToString::to_string)
        .collect()
}
