//! Contents-API client with request quota tracking.
//!
//! Files are requested with the raw media type, but some endpoints still
//! answer with a JSON envelope holding a base64 payload, so both shapes are
//! decoded. The `X-RateLimit-Remaining` header is read after every call;
//! once it reaches zero the client refuses further requests.

use std::borrow::Cow;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{ACCEPT, HeaderMap};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, error, instrument};

use super::{RemoteError, RepoRef};
use crate::config::{Credentials, Settings};
use crate::fetch::build_http_client;

/// Media type asking the contents API for the file body itself.
pub const RAW_MEDIA_TYPE: &str = "application/vnd.github.v3.raw";

/// Response header carrying the remaining request quota.
pub const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";

/// Response header carrying the quota reset time (unix seconds).
pub const RATE_LIMIT_RESET: &str = "x-ratelimit-reset";

const QUOTA_UNKNOWN: u64 = u64::MAX;

/// Decoded contents of one repository path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// Path inside the repository.
    pub path: String,
    /// File bytes after any transfer decoding.
    pub content: Vec<u8>,
    /// Quota reported alongside this response, if the header was present.
    pub remaining_quota: Option<u64>,
}

impl RemoteFile {
    /// Content as text, replacing invalid UTF-8.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}

/// Source of repository files. Implemented by [`GitHubClient`]; tests and
/// alternative hosts can provide their own.
#[async_trait]
pub trait RemoteFiles: Send + Sync {
    /// Fetches `path` from `repo`; `Ok(None)` means the file does not exist.
    async fn fetch(&self, repo: &RepoRef, path: &str) -> Result<Option<RemoteFile>, RemoteError>;
}

#[async_trait]
impl<T: RemoteFiles + ?Sized> RemoteFiles for Arc<T> {
    async fn fetch(&self, repo: &RepoRef, path: &str) -> Result<Option<RemoteFile>, RemoteError> {
        (**self).fetch(repo, path).await
    }
}

#[derive(Debug, Deserialize)]
struct ContentsEnvelope {
    content: Option<String>,
    encoding: Option<String>,
}

/// Decodes a contents response body.
///
/// A JSON envelope with `encoding: "base64"` is unwrapped; any body without
/// an `encoding` field is returned unchanged.
///
/// # Errors
///
/// Returns [`RemoteError::Decode`] when the envelope names an encoding other
/// than base64, has no inline content, or the payload is not valid base64.
pub fn decode_contents(path: &str, body: &[u8]) -> Result<Vec<u8>, RemoteError> {
    let looks_like_json = body
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|b| *b == b'{');
    if !looks_like_json {
        return Ok(body.to_vec());
    }

    let Ok(envelope) = serde_json::from_slice::<ContentsEnvelope>(body) else {
        return Ok(body.to_vec());
    };

    match (envelope.encoding.as_deref(), envelope.content) {
        (None, _) => Ok(body.to_vec()),
        (Some(encoding), Some(content)) if encoding.eq_ignore_ascii_case("base64") => {
            // The API wraps the payload every 60 characters
            let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
            STANDARD
                .decode(compact)
                .map_err(|e| RemoteError::decode(path, e.to_string()))
        }
        (Some(encoding), Some(_)) => Err(RemoteError::decode(
            path,
            format!("unsupported encoding {encoding:?}"),
        )),
        (Some(_), None) => Err(RemoteError::decode(path, "no inline content in response")),
    }
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

/// Authenticated contents-API client.
///
/// Holds the last reported quota; one instance should be shared for a whole
/// run so exhaustion seen by any call stops all later calls.
#[derive(Debug)]
pub struct GitHubClient {
    client: Client,
    api_base: String,
    credentials: Option<Credentials>,
    remaining: AtomicU64,
    reset_at: AtomicU64,
}

impl GitHubClient {
    /// Creates a client for `settings.api_base` using `settings.credentials`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::ClientBuild`] if the HTTP client cannot be built.
    pub fn new(settings: &Settings) -> Result<Self, RemoteError> {
        let client = build_http_client(settings.connect_timeout(), settings.read_timeout())
            .map_err(RemoteError::ClientBuild)?;
        debug!(
            api_base = %settings.api_base,
            authenticated = settings.credentials.is_some(),
            "creating contents API client"
        );
        Ok(Self {
            client,
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            credentials: settings.credentials.clone(),
            remaining: AtomicU64::new(QUOTA_UNKNOWN),
            reset_at: AtomicU64::new(0),
        })
    }

    /// Last quota reported by the API, or `None` before the first response.
    #[must_use]
    pub fn remaining_quota(&self) -> Option<u64> {
        match self.remaining.load(Ordering::SeqCst) {
            QUOTA_UNKNOWN => None,
            value => Some(value),
        }
    }

    /// Contents URL for `path` in `repo`.
    #[must_use]
    pub fn contents_url(&self, repo: &RepoRef, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base,
            repo.owner,
            repo.repo,
            path.trim_start_matches('/')
        )
    }

    fn exhausted(&self) -> RemoteError {
        let reset_at = match self.reset_at.load(Ordering::SeqCst) {
            0 => None,
            at => Some(at),
        };
        RemoteError::QuotaExhausted { reset_at }
    }

    /// Fetches and decodes one file.
    ///
    /// Returns `Ok(None)` when the path does not exist (HTTP 404).
    ///
    /// # Errors
    ///
    /// - [`RemoteError::QuotaExhausted`] if an earlier response reported zero
    ///   remaining quota (no request is sent), or this response was refused
    ///   for lack of quota
    /// - [`RemoteError::Transport`] / [`RemoteError::Timeout`] on network failure
    /// - [`RemoteError::HttpStatus`] on any other non-2xx status
    /// - [`RemoteError::Decode`] if an inline payload cannot be decoded
    #[instrument(skip(self), fields(repo = %repo))]
    pub async fn fetch_file(
        &self,
        repo: &RepoRef,
        path: &str,
    ) -> Result<Option<RemoteFile>, RemoteError> {
        if self.remaining_quota() == Some(0) {
            return Err(self.exhausted());
        }

        let url = self.contents_url(repo, path);
        debug!(url = %url, "requesting repository file");

        let mut request = self.client.get(&url).header(ACCEPT, RAW_MEDIA_TYPE);
        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(&credentials.username, Some(&credentials.token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| RemoteError::transport(&url, e))?;

        let remaining = header_u64(response.headers(), RATE_LIMIT_REMAINING);
        if let Some(reset_at) = header_u64(response.headers(), RATE_LIMIT_RESET) {
            self.reset_at.store(reset_at, Ordering::SeqCst);
        }
        if let Some(remaining) = remaining {
            self.remaining.store(remaining, Ordering::SeqCst);
            debug!(remaining, "API requests remaining");
            if remaining == 0 {
                error!("no API requests remaining");
            }
        }

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(path, "file not found in repository");
            return Ok(None);
        }
        if matches!(status, StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS)
            && remaining == Some(0)
        {
            return Err(self.exhausted());
        }
        if !status.is_success() {
            return Err(RemoteError::http_status(&url, status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| RemoteError::transport(&url, e))?;
        let content = decode_contents(path, &body)?;

        Ok(Some(RemoteFile {
            path: path.to_string(),
            content,
            remaining_quota: remaining,
        }))
    }
}

#[async_trait]
impl RemoteFiles for GitHubClient {
    async fn fetch(&self, repo: &RepoRef, path: &str) -> Result<Option<RemoteFile>, RemoteError> {
        self.fetch_file(repo, path).await
    }
}
