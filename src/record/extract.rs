//! Field extraction from cached project detail pages.
//!
//! A detail page lists its facts as `list-group-item` blocks, each with an
//! `<h6>` heading and a `<p>` body. Headings are mapped onto [`Field`]s via a
//! fixed table; unknown headings are dropped. The shuttle name is read from
//! a badge elsewhere on the page and wins over any heading value.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument, warn};

use super::{ExtractError, Field, ProjectRecord};
use crate::markup::{compile_static_regex, fragment_text, page_title};

/// Text every genuine detail page carries in its `<title>`.
pub const DETAIL_TITLE_MARKER: &str = "efabless";

/// Page headings and the fields they populate.
const HEADING_FIELDS: &[(&str, Field)] = &[
    ("summary", Field::Summary),
    ("description", Field::Summary),
    ("git url", Field::GitUrl),
    ("git repository", Field::GitUrl),
    ("owner", Field::Owner),
    ("process", Field::Process),
    ("shuttle", Field::Mpw),
    ("last tapeout", Field::Tapeout),
    ("tapeout status", Field::Tapeout),
    ("last precheck", Field::Precheck),
    ("precheck status", Field::Precheck),
];

static ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(
        r#"(?is)<div[^>]*class\s*=\s*["'][^"']*\blist-group-item\b[^"']*["'][^>]*>(.*?)</div>"#,
    )
});

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"(?is)<h6[^>]*>(.*?)</h6>"));

static BODY_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"(?is)<p[^>]*>(.*?)</p>"));

static SHUTTLE_BADGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(
        r#"(?is)<span[^>]*class\s*=\s*["'][^"']*\bbadge\b[^"']*["'][^>]*>\s*((?:GF)?MPW-?\d+[A-Z]?)\s*</span>"#,
    )
});

/// Maps a heading's display text to its field, ignoring case and a trailing colon.
#[must_use]
pub fn field_for_heading(heading: &str) -> Option<Field> {
    let normalized = heading.trim().trim_end_matches(':').trim().to_ascii_lowercase();
    HEADING_FIELDS
        .iter()
        .find(|(text, _)| *text == normalized)
        .map(|(_, field)| *field)
}

/// Returns every `(heading, body)` pair found in the page's list-group items.
#[must_use]
pub fn heading_pairs(html: &str) -> Vec<(String, String)> {
    ITEM_RE
        .captures_iter(html)
        .filter_map(|caps| {
            let item = caps.get(1)?.as_str();
            let heading = HEADING_RE.captures(item)?.get(1)?.as_str();
            let body = BODY_RE
                .captures(item)
                .and_then(|c| c.get(1))
                .map_or("", |m| m.as_str());
            Some((fragment_text(heading), fragment_text(body)))
        })
        .collect()
}

/// Shuttle name from the page badge, e.g. `MPW-5`.
#[must_use]
pub fn shuttle_badge(html: &str) -> Option<String> {
    SHUTTLE_BADGE_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_ascii_uppercase())
}

/// Outcome of extracting a whole cache.
#[derive(Debug, Default)]
pub struct ExtractionReport {
    /// Completed records, in the order the cache listed them.
    pub records: Vec<ProjectRecord>,
    /// Documents that were skipped, with the reason.
    pub skipped: Vec<ExtractError>,
}

/// Turns cached detail pages into [`ProjectRecord`]s.
#[derive(Debug, Clone, Default)]
pub struct FieldExtractor {
    selected: HashSet<String>,
}

impl FieldExtractor {
    /// Creates an extractor that flags ids found in `selected`.
    #[must_use]
    pub fn new(selected: HashSet<String>) -> Self {
        Self { selected }
    }

    /// Extracts one record from the page cached under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::SchemaMismatch`] if the page title does not
    /// identify a project detail page.
    pub fn extract(&self, key: &str, html: &str) -> Result<ProjectRecord, ExtractError> {
        let title = page_title(html);
        let is_detail_page = title
            .as_deref()
            .is_some_and(|t| t.to_ascii_lowercase().contains(DETAIL_TITLE_MARKER));
        if !is_detail_page {
            return Err(ExtractError::SchemaMismatch {
                key: key.to_string(),
                title,
            });
        }

        let mut record = ProjectRecord::new(key);
        for (heading, body) in heading_pairs(html) {
            match field_for_heading(&heading) {
                Some(field) if !body.is_empty() => record.set(field, body),
                Some(_) => {}
                None => debug!(key, heading = %heading, "ignoring unknown heading"),
            }
        }

        if let Some(shuttle) = shuttle_badge(html) {
            record.set(Field::Mpw, shuttle);
        }

        let selected = self.selected.contains(key);
        record.set(Field::Selected, selected.to_string());
        Ok(record)
    }

    /// Extracts every cached document, skipping and reporting pages that fail.
    #[instrument(skip(self, documents), fields(documents = documents.len()))]
    pub fn extract_all(&self, documents: &[(String, String)]) -> ExtractionReport {
        let mut report = ExtractionReport::default();
        for (key, html) in documents {
            match self.extract(key, html) {
                Ok(record) => report.records.push(record),
                Err(error) => {
                    warn!(key = %key, error = %error, "skipping cached document");
                    report.skipped.push(error);
                }
            }
        }
        report
    }
}
