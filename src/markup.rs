//! Regex helpers shared by index discovery and field extraction.
//!
//! Catalog pages are scraped with targeted patterns rather than a full DOM;
//! these helpers turn a captured fragment into clean single-line text.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Compiles a static regex pattern, panicking with context if invalid.
#[must_use]
pub fn compile_static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid static regex '{pattern}': {e}"))
}

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| compile_static_regex(r"(?s)<[^>]*>"));

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_static_regex(r"(?is)<title[^>]*>(.*?)</title>"));

/// Decodes the handful of entities the catalog markup actually emits.
#[must_use]
pub fn unescape_basic(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .replace("&#160;", " ")
        .replace("&amp;", "&")
}

/// Strips tags, decodes entities and collapses all whitespace (newlines
/// included) into single spaces.
#[must_use]
pub fn fragment_text(fragment: &str) -> String {
    let without_tags = TAG_RE.replace_all(fragment, " ");
    unescape_basic(&without_tags)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns the text of the document `<title>`, if any.
#[must_use]
pub fn page_title(html: &str) -> Option<String> {
    TITLE_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| fragment_text(m.as_str()))
        .filter(|title| !title.is_empty())
}

/// Resolves `value` against `base_url` unless it is already absolute.
#[must_use]
pub fn absolutize_url(value: &str, base_url: &Url) -> Option<String> {
    if value.starts_with("http://") || value.starts_with("https://") {
        return Some(value.to_string());
    }
    if value.starts_with("//") {
        return Some(format!("https:{value}"));
    }
    base_url.join(value).ok().map(|url| url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_text_strips_tags_and_newlines() {
        let fragment = "<p class=\"mb-0\">An 8-bit\n  CPU &amp; <b>SRAM</b>\r\n</p>";
        assert_eq!(fragment_text(fragment), "An 8-bit CPU & SRAM");
    }

    #[test]
    fn test_unescape_basic_decodes_amp_last() {
        assert_eq!(unescape_basic("&amp;lt;"), "&lt;");
        assert_eq!(unescape_basic("it&#39;s &quot;ok&quot;"), "it's \"ok\"");
    }

    #[test]
    fn test_page_title_found_and_missing() {
        assert_eq!(
            page_title("<html><TITLE>\n Project | Efabless </TITLE></html>").as_deref(),
            Some("Project | Efabless")
        );
        assert_eq!(page_title("<html><body></body></html>"), None);
    }

    #[test]
    fn test_absolutize_url_relative_and_absolute() {
        let base = Url::parse("https://platform.example.com/projects/public").unwrap();
        assert_eq!(
            absolutize_url("/projects/12", &base).as_deref(),
            Some("https://platform.example.com/projects/12")
        );
        assert_eq!(
            absolutize_url("https://other.example.com/x", &base).as_deref(),
            Some("https://other.example.com/x")
        );
        assert_eq!(
            absolutize_url("//cdn.example.com/y", &base).as_deref(),
            Some("https://cdn.example.com/y")
        );
    }
}
