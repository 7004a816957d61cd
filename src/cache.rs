//! Directory-backed cache of fetched detail pages.
//!
//! One file per project id, file name = id, contents = raw page body.
//!
//! # Rebuild semantics
//!
//! [`DocumentCache::rebuild`] never writes into the live directory. It fills
//! a sibling staging directory, moves the live directory aside, renames the
//! staging directory into place and only then deletes the old copy. A
//! failure before the swap leaves the previous cache untouched. Readers that
//! enumerate the directory while the two renames run may still see it
//! missing for that instant; concurrent rebuilds are not supported.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Errors raised by the document cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// File system error while reading or writing the cache.
    #[error("IO error on {path}: {source}")]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The key cannot be used as a file name.
    #[error("invalid cache key {key:?}")]
    InvalidKey {
        /// The rejected key.
        key: String,
    },

    /// No cache directory exists yet.
    #[error("document cache not initialized at {path}")]
    NotInitialized {
        /// Expected cache directory.
        path: PathBuf,
    },
}

impl CacheError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Cache mapping project ids to raw page bodies.
#[derive(Debug, Clone)]
pub struct DocumentCache {
    dir: PathBuf,
}

impl DocumentCache {
    /// Opens a cache rooted at `dir`. Nothing is created until [`rebuild`](Self::rebuild).
    #[must_use]
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether a cache directory exists.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.dir.is_dir()
    }

    /// Replaces the whole cache with `documents`, one file per key.
    ///
    /// Returns the number of documents written.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidKey`] for a key that is not a plain file
    /// name, or [`CacheError::Io`] if staging or swapping fails. In both
    /// cases the previous cache contents are left in place.
    #[instrument(skip(self, documents), fields(dir = %self.dir.display(), documents = documents.len()))]
    pub fn rebuild(&self, documents: &HashMap<String, String>) -> Result<usize, CacheError> {
        let staging = self.sibling("staging");
        remove_dir_if_present(&staging)?;
        fs::create_dir_all(&staging).map_err(|e| CacheError::io(&staging, e))?;

        if let Err(error) = write_documents(&staging, documents) {
            if let Err(cleanup) = fs::remove_dir_all(&staging) {
                warn!(path = %staging.display(), error = %cleanup, "failed to remove staging directory");
            }
            return Err(error);
        }

        let retired = self.sibling("old");
        let had_previous = self.dir.exists();
        if had_previous {
            remove_dir_if_present(&retired)?;
            fs::rename(&self.dir, &retired).map_err(|e| CacheError::io(&self.dir, e))?;
        }

        if let Err(error) = fs::rename(&staging, &self.dir) {
            // Put the previous cache back before reporting
            if had_previous && let Err(restore) = fs::rename(&retired, &self.dir) {
                warn!(path = %retired.display(), error = %restore, "failed to restore previous cache");
            }
            return Err(CacheError::io(&self.dir, error));
        }

        if had_previous && let Err(error) = fs::remove_dir_all(&retired) {
            warn!(path = %retired.display(), error = %error, "failed to remove retired cache");
        }

        info!(written = documents.len(), "document cache rebuilt");
        Ok(documents.len())
    }

    /// Returns every cached `(key, content)` pair in directory order.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::NotInitialized`] if the cache directory is
    /// missing, or [`CacheError::Io`] if a file cannot be read.
    pub fn list_all(&self) -> Result<Vec<(String, String)>, CacheError> {
        if !self.is_initialized() {
            return Err(CacheError::NotInitialized {
                path: self.dir.clone(),
            });
        }

        let entries = fs::read_dir(&self.dir).map_err(|e| CacheError::io(&self.dir, e))?;
        let mut documents = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CacheError::io(&self.dir, e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(key) = path.file_name().and_then(|name| name.to_str()) else {
                warn!(path = %path.display(), "skipping cache file with non UTF-8 name");
                continue;
            };
            let key = key.to_string();
            documents.push((key, read_lossy(&path)?));
        }
        debug!(count = documents.len(), "listed cached documents");
        Ok(documents)
    }

    /// Reads one cached document, or `None` if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidKey`] for a key that is not a plain file
    /// name, or [`CacheError::Io`] if the file exists but cannot be read.
    pub fn read(&self, key: &str) -> Result<Option<String>, CacheError> {
        validate_key(key)?;
        let path = self.dir.join(key);
        if !path.is_file() {
            return Ok(None);
        }
        read_lossy(&path).map(Some)
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let name = self
            .dir
            .file_name()
            .map_or_else(|| "cache".into(), |n| n.to_string_lossy().into_owned());
        let parent = match self.dir.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        parent.join(format!(".{name}.{suffix}"))
    }
}

fn write_documents(dir: &Path, documents: &HashMap<String, String>) -> Result<(), CacheError> {
    for (key, content) in documents {
        validate_key(key)?;
        let path = dir.join(key);
        fs::write(&path, content).map_err(|e| CacheError::io(&path, e))?;
    }
    Ok(())
}

fn validate_key(key: &str) -> Result<(), CacheError> {
    let bad = key.is_empty()
        || key == "."
        || key == ".."
        || key.starts_with('.')
        || key.contains(['/', '\\', '\0']);
    if bad {
        return Err(CacheError::InvalidKey {
            key: key.to_string(),
        });
    }
    Ok(())
}

fn remove_dir_if_present(path: &Path) -> Result<(), CacheError> {
    if path.exists() {
        fs::remove_dir_all(path).map_err(|e| CacheError::io(path, e))?;
    }
    Ok(())
}

fn read_lossy(path: &Path) -> Result<String, CacheError> {
    let bytes = fs::read(path).map_err(|e| CacheError::io(path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
