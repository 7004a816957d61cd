//! Runtime settings shared by every component.
//!
//! A single [`Settings`] value is built at the CLI boundary and passed by
//! reference into component constructors. Nothing in the library reads
//! process-wide configuration on its own.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Default number of detail-page fetches allowed in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 40;

/// Default HTTP connect timeout (10 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default per-request timeout (30 seconds).
pub const READ_TIMEOUT_SECS: u64 = 30;

/// Public project index of the shuttle catalog.
pub const DEFAULT_INDEX_URL: &str = "https://platform.efabless.com/projects/public";

/// Hosted repository contents API.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Static credential for the contents API.
///
/// Pre-shared; the tool never derives or refreshes it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account name sent as the Basic-auth user.
    pub username: String,
    /// Personal access token sent as the Basic-auth password.
    pub token: String,
}

impl Credentials {
    /// Creates a credential pair.
    #[must_use]
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
        }
    }
}

// Keep the token out of `{:?}` output and logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Settings threaded through the fetch pipeline, stores and remote client.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Maximum concurrent detail-page fetches; `0` means unlimited.
    pub concurrency: usize,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds.
    pub read_timeout_secs: u64,
    /// Directory holding one cached detail page per project id.
    pub cache_dir: PathBuf,
    /// Serialized record store.
    pub store_path: PathBuf,
    /// Newline-delimited list of selected project ids.
    pub selected_path: PathBuf,
    /// Cached copy of the rendered index page.
    pub index_cache_path: PathBuf,
    /// Public index page listing every project.
    pub index_url: String,
    /// Rendering endpoint template used when no cached index exists.
    ///
    /// `{url}` is replaced with the percent-encoded index URL and `{token}`
    /// with [`Settings::render_token`].
    pub render_endpoint: Option<String>,
    /// Token for the rendering endpoint.
    pub render_token: Option<String>,
    /// Base URL of the repository contents API.
    pub api_base: String,
    /// Contents API credential.
    pub credentials: Option<Credentials>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            connect_timeout_secs: CONNECT_TIMEOUT_SECS,
            read_timeout_secs: READ_TIMEOUT_SECS,
            cache_dir: PathBuf::from("cache"),
            store_path: PathBuf::from("projects.json"),
            selected_path: PathBuf::from("selected.txt"),
            index_cache_path: PathBuf::from("index.html"),
            index_url: DEFAULT_INDEX_URL.to_string(),
            render_endpoint: None,
            render_token: None,
            api_base: DEFAULT_API_BASE.to_string(),
            credentials: None,
        }
    }
}

impl Settings {
    /// Connect timeout as a [`Duration`].
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Request timeout as a [`Duration`].
    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default_matches_constants() {
        let settings = Settings::default();
        assert_eq!(settings.concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(settings.connect_timeout(), Duration::from_secs(10));
        assert_eq!(settings.read_timeout(), Duration::from_secs(30));
        assert_eq!(settings.api_base, "https://api.github.com");
        assert!(settings.credentials.is_none());
    }

    #[test]
    fn test_credentials_debug_redacts_token() {
        let creds = Credentials::new("octocat", "ghp_secret");
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("octocat"));
        assert!(!rendered.contains("ghp_secret"), "token leaked: {rendered}");
    }
}
