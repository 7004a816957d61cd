//! Read-only queries over a loaded record snapshot.
//!
//! The store has no index; every query is a full scan.

use super::{Field, ProjectRecord};

/// Records whose id equals `id` exactly.
#[must_use]
pub fn by_id<'a>(records: &'a [ProjectRecord], id: &str) -> Vec<&'a ProjectRecord> {
    records.iter().filter(|record| record.id == id).collect()
}

/// Records whose summary contains `term`, ignoring case.
#[must_use]
pub fn search_summary<'a>(records: &'a [ProjectRecord], term: &str) -> Vec<&'a ProjectRecord> {
    let needle = term.to_lowercase();
    records
        .iter()
        .filter(|record| record.summary.to_lowercase().contains(&needle))
        .collect()
}

/// Projects each record onto `fields`, one row per record.
#[must_use]
pub fn project_fields<'a>(
    records: impl IntoIterator<Item = &'a ProjectRecord>,
    fields: &[Field],
) -> Vec<Vec<&'a str>> {
    records
        .into_iter()
        .map(|record| fields.iter().map(|field| record.get(*field)).collect())
        .collect()
}
