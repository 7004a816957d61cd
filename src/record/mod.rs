//! Project records: the canonical field set, extraction and persistence.
//!
//! A [`ProjectRecord`] always carries every [`Field`]; anything the page did
//! not provide holds [`NOT_AVAILABLE`].

mod error;
pub mod extract;
pub mod query;
pub mod selected;
pub mod store;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use error::{ExtractError, StoreError};
pub use extract::{ExtractionReport, FieldExtractor};
pub use selected::load_selected_ids;
pub use store::{RecordStore, sort_by_numeric_id};

/// Sentinel stored for any field the source page did not provide.
pub const NOT_AVAILABLE: &str = "n/a";

/// Canonical record fields shared by the extractor, store and CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    Summary,
    GitUrl,
    Owner,
    Process,
    Mpw,
    Tapeout,
    Precheck,
    Selected,
}

impl Field {
    /// Every field in display order.
    pub const ALL: [Field; 9] = [
        Field::Id,
        Field::Summary,
        Field::GitUrl,
        Field::Owner,
        Field::Process,
        Field::Mpw,
        Field::Tapeout,
        Field::Precheck,
        Field::Selected,
    ];

    /// Stable field name used in the store and on the command line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Summary => "summary",
            Self::GitUrl => "giturl",
            Self::Owner => "owner",
            Self::Process => "process",
            Self::Mpw => "mpw",
            Self::Tapeout => "tapeout",
            Self::Precheck => "precheck",
            Self::Selected => "selected",
        }
    }

    /// Parses a comma-separated field list such as `id,owner,mpw`.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownField`] for the first name that is not a field.
    pub fn parse_list(raw: &str) -> Result<Vec<Field>, UnknownField> {
        raw.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field name that is not part of the canonical set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field {0:?}; expected one of id, summary, giturl, owner, process, mpw, tapeout, precheck, selected")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownField(s.to_string()))
    }
}

/// One catalog entry with every canonical field present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: String,
    pub summary: String,
    pub giturl: String,
    pub owner: String,
    pub process: String,
    pub mpw: String,
    pub tapeout: String,
    pub precheck: String,
    pub selected: String,
}

impl ProjectRecord {
    /// Creates a record for `id` with every other field set to [`NOT_AVAILABLE`].
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        let na = || NOT_AVAILABLE.to_string();
        Self {
            id: id.into(),
            summary: na(),
            giturl: na(),
            owner: na(),
            process: na(),
            mpw: na(),
            tapeout: na(),
            precheck: na(),
            selected: na(),
        }
    }

    /// Value of `field`.
    #[must_use]
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Id => &self.id,
            Field::Summary => &self.summary,
            Field::GitUrl => &self.giturl,
            Field::Owner => &self.owner,
            Field::Process => &self.process,
            Field::Mpw => &self.mpw,
            Field::Tapeout => &self.tapeout,
            Field::Precheck => &self.precheck,
            Field::Selected => &self.selected,
        }
    }

    /// Replaces the value of `field`.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Id => self.id = value,
            Field::Summary => self.summary = value,
            Field::GitUrl => self.giturl = value,
            Field::Owner => self.owner = value,
            Field::Process => self.process = value,
            Field::Mpw => self.mpw = value,
            Field::Tapeout => self.tapeout = value,
            Field::Precheck => self.precheck = value,
            Field::Selected => self.selected = value,
        }
    }

    /// Whether the operator flagged this project.
    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.selected == "true"
    }
}
