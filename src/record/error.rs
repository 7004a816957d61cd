//! Error types for record extraction and persistence.

use std::path::PathBuf;

use thiserror::Error;

/// Per-document extraction failure. The pass skips the document and continues.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The cached page is not a project detail page.
    #[error("cached document {key} is not a project detail page (title: {title:?})")]
    SchemaMismatch {
        /// Cache key of the offending document.
        key: String,
        /// Title found in the page, if any.
        title: Option<String>,
    },
}

impl ExtractError {
    /// Cache key of the document that failed.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::SchemaMismatch { key, .. } => key,
        }
    }
}

/// Errors raised by the record store and its side inputs.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record store file exists yet.
    #[error("record store not initialized at {path}; run `mpw-catalog update-cache` first")]
    NotInitialized {
        /// Expected store path.
        path: PathBuf,
    },

    /// File system error.
    #[error("IO error on {path}: {source}")]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The store file exists but does not hold a record list.
    #[error("corrupt record store {path}: {source}")]
    Corrupt {
        /// Store path.
        path: PathBuf,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// Records could not be serialized.
    #[error("failed to serialize records: {0}")]
    Serialize(#[source] serde_json::Error),

    /// An id that does not parse as an integer, so the snapshot cannot be ordered.
    #[error("project id {id:?} is not numeric")]
    NonNumericId {
        /// The offending id.
        id: String,
    },

    /// The same id appears twice.
    #[error("duplicate project id {id}")]
    DuplicateId {
        /// The repeated id.
        id: String,
    },
}

impl StoreError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the caller should build the store before retrying.
    #[must_use]
    pub fn is_not_initialized(&self) -> bool {
        matches!(self, Self::NotInitialized { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_initialized_message_is_actionable() {
        let error = StoreError::NotInitialized {
            path: PathBuf::from("projects.json"),
        };
        let msg = error.to_string();
        assert!(msg.contains("projects.json"), "Expected path in: {msg}");
        assert!(msg.contains("update-cache"), "Expected next step in: {msg}");
        assert!(error.is_not_initialized());
    }

    #[test]
    fn test_schema_mismatch_reports_key() {
        let error = ExtractError::SchemaMismatch {
            key: "1234".to_string(),
            title: Some("Sign in".to_string()),
        };
        assert_eq!(error.key(), "1234");
        assert!(error.to_string().contains("1234"));
    }
}
