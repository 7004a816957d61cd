//! Discovery of project detail-page URLs from the public index.
//!
//! The index is rendered client-side, so it is fetched once through a
//! rendering endpoint and cached on disk; later runs reuse the cached copy.

use std::fs;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::{debug, info, instrument};
use url::Url;
use url::form_urlencoded::byte_serialize;

use crate::config::Settings;
use crate::fetch::{FetchError, PageClient};
use crate::markup::{absolutize_url, compile_static_regex};

/// Class list of the card wrapping each project on the index page.
pub const PROJECT_CARD_CLASS: &str = "col-12 col-md-6 col-xl-4 col-xxl-3 mb-3";

static CARD_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(&format!(
        r#"(?i)<div[^>]*class\s*=\s*["']{}["'][^>]*>"#,
        regex::escape(PROJECT_CARD_CLASS)
    ))
});

static HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r#"(?is)<a\s[^>]*?href\s*=\s*["']([^"']+)["']"#)
});

/// Errors raised while obtaining the index page.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Reading or writing the cached index failed.
    #[error("IO error on index cache {path}: {source}")]
    Io {
        /// Index cache path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// No cached index and no rendering endpoint configured.
    #[error(
        "no cached index at {path} and no render endpoint configured; set `render_endpoint` in the config file"
    )]
    NoRenderer {
        /// Index cache path that was checked.
        path: PathBuf,
    },

    /// The configured index URL is not a valid URL.
    #[error("invalid index URL: {url}")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
    },

    /// The rendering request failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Builds the rendering request URL from `template`.
///
/// `{url}` becomes the percent-encoded `target` and `{token}` the token.
#[must_use]
pub fn render_url(template: &str, target: &str, token: Option<&str>) -> String {
    let encoded: String = byte_serialize(target.as_bytes()).collect();
    template
        .replace("{url}", &encoded)
        .replace("{token}", token.unwrap_or_default())
}

/// Returns the index page, from cache or through the rendering endpoint.
///
/// A freshly rendered page is written to the cache before returning.
///
/// # Errors
///
/// Returns [`IndexError::NoRenderer`] when there is neither a cache nor an
/// endpoint, [`IndexError::Fetch`] if rendering fails, and
/// [`IndexError::Io`] on cache read/write failure.
#[instrument(skip(settings, client), fields(cache = %settings.index_cache_path.display()))]
pub async fn load_index_page(settings: &Settings, client: &PageClient) -> Result<String, IndexError> {
    let path = &settings.index_cache_path;
    if path.is_file() {
        debug!("using cached index page");
        return fs::read_to_string(path).map_err(|source| IndexError::Io {
            path: path.clone(),
            source,
        });
    }

    let Some(template) = settings.render_endpoint.as_deref() else {
        return Err(IndexError::NoRenderer { path: path.clone() });
    };

    info!(url = %settings.index_url, "rendering index page; this can take a while");
    let request_url = render_url(template, &settings.index_url, settings.render_token.as_deref());
    let page = client.get_text(&request_url).await?;

    fs::write(path, &page).map_err(|source| IndexError::Io {
        path: path.clone(),
        source,
    })?;
    info!(bytes = page.len(), "index page cached");
    Ok(page)
}

/// Extracts the first link of every project card, resolved against `base`.
#[must_use]
pub fn parse_index(html: &str, base: &Url) -> Vec<String> {
    let starts: Vec<usize> = CARD_RE.find_iter(html).map(|m| m.end()).collect();
    let mut urls = Vec::with_capacity(starts.len());
    for (index, start) in starts.iter().enumerate() {
        let end = starts.get(index + 1).copied().unwrap_or(html.len());
        let card = &html[*start..end];
        let Some(href) = HREF_RE.captures(card).and_then(|caps| caps.get(1)) else {
            continue;
        };
        if let Some(url) = absolutize_url(href.as_str().trim(), base) {
            urls.push(url);
        }
    }
    info!(found = urls.len(), "found project urls");
    urls
}

/// Parses the configured index URL.
///
/// # Errors
///
/// Returns [`IndexError::InvalidUrl`] if it is not an absolute URL.
pub fn index_base(settings: &Settings) -> Result<Url, IndexError> {
    Url::parse(&settings.index_url).map_err(|_| IndexError::InvalidUrl {
        url: settings.index_url.clone(),
    })
}
