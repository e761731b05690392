// src/analyze/html.rs
// =============================================================================
// This module discovers candidate paths from HTML response bodies.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Never fails: broken markup is repaired the way a browser would do it
// - Supports CSS selectors for finding elements
//
// Rules for each <a href="...">:
// - http:// or https:// URLs are kept only when they point at the scanned
//   host, and only their path component is kept. The scheme doesn't matter,
//   an explicit port does
// - Root-relative hrefs ("/x") are kept verbatim
// - mailto:, tel:, javascript: and "#fragment" hrefs are dropped
// - Anything else ("page.html", "docs/x") becomes root-relative ("/page.html")
// =============================================================================

use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::debug;
use url::Url;

// Extracts candidate paths from HTML content
//
// Parameters:
//   html: the response body (untrusted, possibly not HTML at all)
//   base: the scan target, used for the same-host check
//
// Returns: the set of discovered paths (empty when nothing usable was found)
pub fn extract_html_paths(html: &str, base: &Url) -> HashSet<String> {
    let mut paths = HashSet::new();

    // "a[href]" is a constant selector, parsing only fails for invalid CSS
    let selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(e) => {
            debug!(error = ?e, "Anchor selector rejected");
            return paths;
        }
    };

    let document = Html::parse_document(html);

    for element in document.select(&selector) {
        if let Some(href) = element.value().attr("href") {
            if let Some(path) = href_to_path(href, base) {
                paths.insert(path);
            }
        }
    }

    paths
}

// Turns one href into a root-relative path, or None if it should be dropped
fn href_to_path(href: &str, base: &Url) -> Option<String> {
    if href.starts_with("http://") || href.starts_with("https://") {
        let parsed = Url::parse(href).ok()?;
        return same_host(&parsed, base).then(|| parsed.path().to_string());
    }

    if href.starts_with('/') {
        return Some(href.to_string());
    }

    if href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
        || href.starts_with('#')
    {
        return None;
    }

    Some(format!("/{}", href))
}

// Compares host and explicitly written port only. An https link on an http
// target is still the same host, so the scheme's default port is ignored.
fn same_host(candidate: &Url, base: &Url) -> bool {
    candidate.host_str() == base.host_str() && candidate.port() == base.port()
}
