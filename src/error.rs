// src/error.rs
// =============================================================================
// Typed errors for the parts of the scanner that can fail before a scan
// starts. Probe failures live next to the prober (src/probe/http.rs) because
// they're never fatal.
// =============================================================================

use thiserror::Error;

/// Everything that can be wrong with a scan configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid target URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Target URL must use http or https, got '{0}'")]
    UnsupportedScheme(String),

    #[error("Invalid HTTP method '{0}'")]
    InvalidMethod(String),

    #[error("Invalid header '{0}'")]
    InvalidHeader(String),

    #[error("Invalid proxy URL '{url}': {source}")]
    InvalidProxy {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Worker count must be at least 1")]
    NoWorkers,
}
