//! Error types for the remote contents client.

use thiserror::Error;

/// Errors that can occur while fetching a file from a hosted repository.
///
/// A missing file is not an error; see
/// [`GitHubClient::fetch_file`](super::GitHubClient::fetch_file).
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The API reported no remaining request quota for this credential.
    ///
    /// Every later call in the same run is refused without touching the network.
    #[error("contents API request quota exhausted{}", reset_hint(.reset_at))]
    QuotaExhausted {
        /// Unix time at which the quota resets, when the API reported it.
        reset_at: Option<u64>,
    },

    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error fetching {url}: {source}")]
    Transport {
        /// Request URL.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout fetching {url}")]
    Timeout {
        /// Request URL.
        url: String,
    },

    /// Non-2xx response other than 404.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// Request URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response claimed an inline payload that could not be decoded.
    #[error("could not decode contents of {path}: {reason}")]
    Decode {
        /// Repository path being fetched.
        path: String,
        /// Why decoding failed.
        reason: String,
    },

    /// A repository URL that does not split into exactly owner and repo.
    #[error("cannot split repository from {url:?}")]
    InvalidRepoUrl {
        /// The offending URL.
        url: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

#[allow(clippy::ref_option)]
fn reset_hint(reset_at: &Option<u64>) -> String {
    reset_at.map_or_else(String::new, |at| format!(" (resets at unix time {at})"))
}

impl RemoteError {
    /// Creates a transport error from a reqwest error, classifying timeouts.
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            return Self::Timeout { url: url.into() };
        }
        Self::Transport {
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

    /// Creates a decode error.
    pub fn decode(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid repository URL error.
    pub fn invalid_repo_url(url: impl Into<String>) -> Self {
        Self::InvalidRepoUrl { url: url.into() }
    }

    /// Whether this error must stop all further remote calls in the run.
    #[must_use]
    pub fn is_quota_exhausted(&self) -> bool {
        matches!(self, Self::QuotaExhausted { .. })
    }
}
