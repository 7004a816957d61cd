//! Flat, file-backed record store.
//!
//! The whole record set is one JSON array. Saves go through a temp file in
//! the same directory followed by a rename, so a reader sees either the old
//! file or the new one, never a partial write.

use std::collections::HashSet;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

use super::{ProjectRecord, StoreError};

/// Sorts records ascending by their id parsed as an integer.
///
/// # Errors
///
/// Returns [`StoreError::NonNumericId`] for the first id that does not parse;
/// `records` is left unchanged in that case.
pub fn sort_by_numeric_id(records: &mut Vec<ProjectRecord>) -> Result<(), StoreError> {
    let mut numbers = Vec::with_capacity(records.len());
    for record in records.iter() {
        let number = record
            .id
            .trim()
            .parse::<u64>()
            .map_err(|_| StoreError::NonNumericId {
                id: record.id.clone(),
            })?;
        numbers.push(number);
    }

    let mut keyed: Vec<(u64, ProjectRecord)> = numbers.into_iter().zip(records.drain(..)).collect();
    keyed.sort_by_key(|(number, _)| *number);
    records.extend(keyed.into_iter().map(|(_, record)| record));
    Ok(())
}

fn ensure_unique_ids(records: &[ProjectRecord]) -> Result<(), StoreError> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.id.as_str()) {
            return Err(StoreError::DuplicateId {
                id: record.id.clone(),
            });
        }
    }
    Ok(())
}

/// Persisted catalog of [`ProjectRecord`]s.
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    /// Creates a store backed by the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the stored record set with `records`.
    ///
    /// Records are written in numeric id order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NonNumericId`] or [`StoreError::DuplicateId`]
    /// before touching disk if the set could not be loaded back, and
    /// [`StoreError::Io`] if the write or rename fails.
    #[instrument(skip(self, records), fields(path = %self.path.display(), records = records.len()))]
    pub fn save(&self, records: &[ProjectRecord]) -> Result<(), StoreError> {
        let mut ordered = records.to_vec();
        sort_by_numeric_id(&mut ordered)?;
        ensure_unique_ids(&ordered)?;

        let payload = serde_json::to_vec_pretty(&ordered).map_err(StoreError::Serialize)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;

        let mut staged = NamedTempFile::new_in(&dir).map_err(|e| StoreError::io(&dir, e))?;
        let staged_path = staged.path().to_path_buf();
        staged
            .write_all(&payload)
            .map_err(|e| StoreError::io(&staged_path, e))?;
        staged
            .as_file()
            .sync_all()
            .map_err(|e| StoreError::io(&staged_path, e))?;
        staged
            .persist(&self.path)
            .map_err(|e| StoreError::io(&self.path, e.error))?;

        info!(saved = ordered.len(), "record store written");
        Ok(())
    }

    /// Loads the full record set sorted by numeric id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotInitialized`] if no store file exists,
    /// [`StoreError::Corrupt`] if it does not parse, and
    /// [`StoreError::NonNumericId`] / [`StoreError::DuplicateId`] if the
    /// contents break the id invariants.
    pub fn load(&self) -> Result<Vec<ProjectRecord>, StoreError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotInitialized {
                    path: self.path.clone(),
                });
            }
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        let mut records: Vec<ProjectRecord> =
            serde_json::from_slice(&raw).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        sort_by_numeric_id(&mut records)?;
        ensure_unique_ids(&records)?;

        debug!(path = %self.path.display(), records = records.len(), "record store loaded");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn records(ids: &[&str]) -> Vec<ProjectRecord> {
        ids.iter().map(|id| ProjectRecord::new(*id)).collect()
    }

    fn ids(records: &[ProjectRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_sort_by_numeric_id_is_numeric_not_lexical() {
        let mut set = records(&["100", "9", "25"]);
        sort_by_numeric_id(&mut set).unwrap();
        assert_eq!(ids(&set), vec!["9", "25", "100"]);
    }

    #[test]
    fn test_sort_by_numeric_id_fails_loudly_and_keeps_records() {
        let mut set = records(&["3", "abc", "1"]);
        let error = sort_by_numeric_id(&mut set).unwrap_err();
        assert!(matches!(error, StoreError::NonNumericId { ref id } if id == "abc"));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_save_then_load_round_trip_sorted() {
        let temp = TempDir::new().unwrap();
        let store = RecordStore::new(temp.path().join("projects.json"));
        let mut saved = records(&["30", "2", "11"]);
        saved[0].owner = "alice".to_string();

        store.save(&saved).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(ids(&loaded), vec!["2", "11", "30"]);
        assert_eq!(loaded[2].owner, "alice");
    }

    #[test]
    fn test_save_of_loaded_snapshot_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let store = RecordStore::new(temp.path().join("projects.json"));
        store.save(&records(&["5", "1", "3"])).unwrap();
        let first = fs::read(store.path()).unwrap();

        let loaded = store.load().unwrap();
        store.save(&loaded).unwrap();
        let second = fs::read(store.path()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_load_missing_store_is_not_initialized() {
        let temp = TempDir::new().unwrap();
        let store = RecordStore::new(temp.path().join("projects.json"));
        let error = store.load().unwrap_err();
        assert!(error.is_not_initialized(), "got {error:?}");
    }

    #[test]
    fn test_load_corrupt_store_reports_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("projects.json");
        fs::write(&path, b"{ not json").unwrap();
        let error = RecordStore::new(&path).load().unwrap_err();
        assert!(matches!(error, StoreError::Corrupt { .. }));
        assert!(error.to_string().contains("projects.json"));
    }

    #[test]
    fn test_save_rejects_duplicate_ids_without_touching_file() {
        let temp = TempDir::new().unwrap();
        let store = RecordStore::new(temp.path().join("projects.json"));
        store.save(&records(&["1"])).unwrap();

        let error = store.save(&records(&["2", "2"])).unwrap_err();
        assert!(matches!(error, StoreError::DuplicateId { .. }));
        assert_eq!(ids(&store.load().unwrap()), vec!["1"]);
    }

    #[test]
    fn test_save_rejects_non_numeric_id() {
        let temp = TempDir::new().unwrap();
        let store = RecordStore::new(temp.path().join("projects.json"));
        assert!(matches!(
            store.save(&records(&["x1"])),
            Err(StoreError::NonNumericId { .. })
        ));
        assert!(!store.path().exists());
    }

    #[test]
    fn test_save_leaves_no_temp_files_behind() {
        let temp = TempDir::new().unwrap();
        let store = RecordStore::new(temp.path().join("projects.json"));
        store.save(&records(&["1", "2"])).unwrap();
        let entries: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
