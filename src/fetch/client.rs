//! HTTP client wrapper for fetching catalog pages.
//!
//! One [`PageClient`] is created per run and cloned into every fetch task so
//! all detail-page requests share a single connection pool.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, instrument};

use super::error::FetchError;
use crate::config::Settings;
use crate::user_agent;

/// HTTP client for fetching catalog pages as text.
#[derive(Debug, Clone)]
pub struct PageClient {
    client: Client,
}

impl PageClient {
    /// Creates a page client with the timeouts from `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] if the underlying client cannot be
    /// constructed (for example, a broken TLS backend).
    pub fn new(settings: &Settings) -> Result<Self, FetchError> {
        let client = build_http_client(settings.connect_timeout(), settings.read_timeout())
            .map_err(FetchError::ClientBuild)?;
        Ok(Self { client })
    }

    /// Creates a page client with explicit timeout values.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] if the client cannot be constructed.
    pub fn with_timeouts(connect: Duration, read: Duration) -> Result<Self, FetchError> {
        let client = build_http_client(connect, read).map_err(FetchError::ClientBuild)?;
        Ok(Self { client })
    }

    /// Fetches `url` and returns the body as text.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on transport failure, timeout, or a non-2xx status.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http_status(url, status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::network(url, e))?;
        debug!(bytes = body.len(), "page fetched");
        Ok(body)
    }
}

/// Builds a reqwest client with the crate-wide User-Agent and timeouts.
pub(crate) fn build_http_client(
    connect_timeout: Duration,
    read_timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(read_timeout)
        .user_agent(user_agent::default_user_agent())
        .gzip(true)
        .build()
}
