// src/analyze/mod.rs
// =============================================================================
// This module contains everything that inspects a response once it arrived.
//
// Submodules:
// - patterns: severity-tiered sensitive data patterns (the classifier)
// - html: path discovery from <a href> links
// - json: path discovery from JSON object fields
//
// Both discovery attempts are pure and infallible from the caller's point of
// view: bad input just means nothing was discovered.
// =============================================================================

mod html;
mod json;
mod patterns;

pub use html::extract_html_paths;
pub use json::extract_json_paths;
pub use patterns::{Finding, Location, PatternMatcher, Severity};

use std::collections::HashSet;
use url::Url;

/// Discovers candidate paths in a response body.
///
/// The body is tried as HTML and as JSON, always both: a body can look like
/// broken HTML and still be valid JSON. The results are unioned.
pub fn extract_links(body: &str, base: &Url) -> HashSet<String> {
    let mut paths = extract_html_paths(body, base);
    paths.extend(extract_json_paths(body));
    paths
}
