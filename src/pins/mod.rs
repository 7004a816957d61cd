//! Maximum macro pin count for a project's submitted design.
//!
//! For one project the engine fetches the wrapper DEF, lists the macros it
//! places, fetches each macro's LEF and counts `PIN` markers. The result is
//! the largest count over all macros.
//!
//! Missing or malformed inputs count as zero so a survey over hundreds of
//! projects keeps going. Only quota exhaustion stops the work, because any
//! number reported after that point would be indistinguishable from a real
//! zero.

mod def;

use std::io::Write;

use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

pub use def::{DefComponents, MacroSource};

use crate::record::ProjectRecord;
use crate::remote::{RemoteError, RemoteFiles, RepoRef};

/// Repository path of the top-level design database.
pub const DEF_PATH: &str = "def/user_project_wrapper.def";

/// Marker counted in a LEF file, once per occurrence.
pub const PIN_MARKER: &str = "PIN";

/// Repository path of the LEF describing `macro_name`.
#[must_use]
pub fn lef_path(macro_name: &str) -> String {
    format!("lef/{macro_name}.lef")
}

/// Counts literal occurrences of [`PIN_MARKER`] in LEF text.
#[must_use]
pub fn count_pins(lef_text: &str) -> usize {
    lef_text.matches(PIN_MARKER).count()
}

/// Result of running the engine over many records.
#[derive(Debug, Default)]
pub struct PinSurvey {
    /// `(id, pins)` for every record that was computed, in input order.
    pub counts: Vec<(String, usize)>,
    /// Records whose design file could not be fetched.
    pub skipped: Vec<(String, RemoteError)>,
    /// Set when the run stopped early for lack of quota.
    pub stopped: Option<RemoteError>,
    /// Records never attempted because the run stopped.
    pub unvisited: usize,
}

impl PinSurvey {
    /// Highest pin count and the first record that reached it.
    #[must_use]
    pub fn max(&self) -> Option<(&str, usize)> {
        self.counts
            .iter()
            .fold(None, |best: Option<(&str, usize)>, (id, pins)| match best {
                Some((_, top)) if top >= *pins => best,
                _ => Some((id.as_str(), *pins)),
            })
    }

    /// Whether every record was attempted.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.stopped.is_none()
    }
}

/// Computes pin counts from repository contents.
#[derive(Debug)]
pub struct PinCountEngine<F, M = DefComponents> {
    files: F,
    macro_source: M,
}

impl<F: RemoteFiles> PinCountEngine<F, DefComponents> {
    /// Creates an engine using the built-in DEF component scanner.
    pub fn new(files: F) -> Self {
        Self::with_macro_source(files, DefComponents)
    }
}

impl<F: RemoteFiles, M: MacroSource> PinCountEngine<F, M> {
    /// Creates an engine with a custom DEF macro source.
    pub fn with_macro_source(files: F, macro_source: M) -> Self {
        Self {
            files,
            macro_source,
        }
    }

    /// Remote file source used by the engine.
    pub fn files(&self) -> &F {
        &self.files
    }

    /// Maximum pin count across the macros of `record`'s design.
    ///
    /// Returns `Ok(0)` when the repository URL is malformed, the DEF is
    /// absent, or it lists no usable components. A macro whose LEF is absent
    /// or fails to fetch contributes zero.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::QuotaExhausted`] as soon as any call reports
    /// it, and any other [`RemoteError`] raised while fetching the DEF itself.
    #[instrument(skip(self, record), fields(id = %record.id))]
    pub async fn compute_pins(&self, record: &ProjectRecord) -> Result<usize, RemoteError> {
        let repo = match RepoRef::parse(&record.giturl) {
            Ok(repo) => repo,
            Err(error) => {
                warn!(giturl = %record.giturl, error = %error, "couldn't split repo");
                return Ok(0);
            }
        };

        let Some(def) = self.files.fetch(&repo, DEF_PATH).await? else {
            debug!(repo = %repo, "no wrapper DEF in repository");
            return Ok(0);
        };

        let macros = match self.macro_names(&def.content) {
            Ok(Some(macros)) => macros,
            Ok(None) => {
                warn!(giturl = %record.giturl, "no macros found");
                return Ok(0);
            }
            Err(error) => {
                warn!(giturl = %record.giturl, error = %error, "failed to read DEF components");
                return Ok(0);
            }
        };

        let mut max_pins = 0;
        for macro_name in &macros {
            let pins = match self.files.fetch(&repo, &lef_path(macro_name)).await {
                Ok(Some(lef)) => count_pins(&lef.text()),
                Ok(None) => 0,
                Err(error) if error.is_quota_exhausted() => return Err(error),
                Err(error) => {
                    warn!(macro_name, error = %error, "failed to fetch LEF; counting as 0");
                    0
                }
            };
            debug!(macro_name, pins, "macro pin count");
            max_pins = max_pins.max(pins);
        }

        Ok(max_pins)
    }

    /// Runs [`compute_pins`](Self::compute_pins) over every record.
    ///
    /// Per-record failures are collected in [`PinSurvey::skipped`]. Quota
    /// exhaustion stops the loop and is recorded in [`PinSurvey::stopped`].
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub async fn survey(&self, records: &[ProjectRecord]) -> PinSurvey {
        let mut survey = PinSurvey::default();
        for (index, record) in records.iter().enumerate() {
            match self.compute_pins(record).await {
                Ok(pins) => {
                    info!(id = %record.id, pins, "pin count");
                    survey.counts.push((record.id.clone(), pins));
                }
                Err(error) if error.is_quota_exhausted() => {
                    survey.unvisited = records.len() - index - 1;
                    survey.stopped = Some(error);
                    break;
                }
                Err(error) => {
                    warn!(id = %record.id, error = %error, "skipping project");
                    survey.skipped.push((record.id.clone(), error));
                }
            }
        }
        survey
    }

    fn macro_names(&self, def_content: &[u8]) -> std::io::Result<Option<Vec<String>>> {
        let mut staged = NamedTempFile::new()?;
        staged.write_all(def_content)?;
        staged.flush()?;
        self.macro_source.macros(staged.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_pins_counts_literal_marker() {
        let lef = "MACRO m\n  PIN a\n  END a\n  PIN b\n  END b\n  PINS\nEND m\n";
        assert_eq!(count_pins(lef), 3);
        assert_eq!(count_pins(""), 0);
    }

    #[test]
    fn test_lef_path_layout() {
        assert_eq!(lef_path("user_proj_example"), "lef/user_proj_example.lef");
    }

    #[test]
    fn test_survey_max_keeps_first_of_ties() {
        let survey = PinSurvey {
            counts: vec![
                ("1".to_string(), 4),
                ("2".to_string(), 9),
                ("3".to_string(), 9),
            ],
            ..PinSurvey::default()
        };
        assert_eq!(survey.max(), Some(("2", 9)));
        assert!(survey.is_complete());
    }

    #[test]
    fn test_survey_max_empty_is_none() {
        assert_eq!(PinSurvey::default().max(), None);
    }
}
