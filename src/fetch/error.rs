//! Error types for the fetch module.
//!
//! Every variant carries the URL it concerns so a failed item can be
//! reported on its own without aborting the rest of the batch.

use thiserror::Error;

/// Errors that can occur while fetching a single catalog page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Non-2xx response.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The URL is malformed or has no path segment to key the result by.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// Another URL in the same batch already maps to this document key.
    #[error("{url} duplicates document key {key} (first seen at {first_url})")]
    DuplicateKey {
        /// The URL that was not fetched.
        url: String,
        /// The shared document key.
        key: String,
        /// The URL that claimed the key first.
        first_url: String,
    },

    /// The fetch task ended without producing a result.
    #[error("fetch task for {url} aborted: {reason}")]
    Aborted {
        /// The URL whose task was lost.
        url: String,
        /// What happened to the task.
        reason: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl FetchError {
    /// Creates a network error from a reqwest error, classifying timeouts.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            return Self::Timeout { url: url.into() };
        }
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a duplicate-key error.
    pub fn duplicate_key(
        url: impl Into<String>,
        key: impl Into<String>,
        first_url: impl Into<String>,
    ) -> Self {
        Self::DuplicateKey {
            url: url.into(),
            key: key.into(),
            first_url: first_url.into(),
        }
    }

    /// Creates an aborted-task error.
    pub fn aborted(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Aborted {
            url: url.into(),
            reason: reason.into(),
        }
    }
}
