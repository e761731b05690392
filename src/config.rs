// src/config.rs
// =============================================================================
// This module turns raw command-line arguments into a validated ScanConfig.
//
// Everything that can be checked before the first request is checked here:
// - the target URL parses and is http/https
// - the HTTP method is a valid token
// - every custom header has a valid name and value
// - the worker count is non-zero
//
// Malformed "Name: Value" / "key=value" tokens are skipped with a warning,
// they don't abort the scan.
// =============================================================================

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;
use url::Url;

use crate::cli::{Cli, OutputFormat};
use crate::crawl::{EngineOptions, PathSources};
use crate::error::ConfigError;
use crate::probe::{RequestSpec, DEFAULT_TIMEOUT};

/// A fully validated scan configuration
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Parsed target, used for the same-host check on discovered links
    pub target: Url,
    /// Target as given, without trailing slash; paths are appended to it
    pub base_url: String,
    pub request: RequestSpec,
    pub proxy: Option<String>,
    pub timeout: Duration,
    pub sources: PathSources,
    pub engine: EngineOptions,
    pub output: OutputFormat,
    pub output_dir: PathBuf,
    pub verbose: bool,
}

impl ScanConfig {
    /// A configuration with every option at its default
    pub fn new(url: &str) -> Result<Self, ConfigError> {
        let (target, base_url) = parse_target(url)?;
        Ok(Self {
            target,
            base_url,
            request: RequestSpec::default(),
            proxy: None,
            timeout: DEFAULT_TIMEOUT,
            sources: PathSources::default(),
            engine: EngineOptions::default(),
            output: OutputFormat::Json,
            output_dir: PathBuf::from("."),
            verbose: false,
        })
    }

    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        if cli.threads == 0 {
            return Err(ConfigError::NoWorkers);
        }

        let mut config = Self::new(&cli.url)?;

        config.request = RequestSpec {
            method: parse_method(&cli.method)?,
            headers: parse_headers(&cli.headers)?,
            params: parse_params(&cli.params),
            body: cli.data.clone(),
        };
        config.proxy = cli.proxy.clone();
        config.timeout = Duration::from_secs(cli.timeout);
        config.sources = PathSources {
            explicit: cli.paths.clone(),
            paths_file: cli.paths_file.clone(),
            use_defaults: cli.default_paths,
        };
        config.engine = EngineOptions {
            workers: cli.threads,
            verbose: cli.verbose,
            ..EngineOptions::default()
        };
        config.output = cli.output;
        config.output_dir = cli.output_dir.clone();
        config.verbose = cli.verbose;

        Ok(config)
    }
}

fn parse_target(url: &str) -> Result<(Url, String), ConfigError> {
    let target = Url::parse(url).map_err(|source| ConfigError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;

    if target.scheme() != "http" && target.scheme() != "https" {
        return Err(ConfigError::UnsupportedScheme(target.scheme().to_string()));
    }

    Ok((target, url.trim_end_matches('/').to_string()))
}

fn parse_method(raw: &str) -> Result<Method, ConfigError> {
    let upper = raw.trim().to_uppercase();
    Method::from_bytes(upper.as_bytes()).map_err(|_| ConfigError::InvalidMethod(raw.to_string()))
}

// Parses "Name: Value" tokens, splitting on the first ':'
pub fn parse_headers(tokens: &[String]) -> Result<HeaderMap, ConfigError> {
    let mut headers = HeaderMap::new();

    for token in tokens {
        let Some((name, value)) = token.split_once(':') else {
            warn!(header = %token, "Ignoring header without ':'");
            continue;
        };

        let name = HeaderName::from_bytes(name.trim().as_bytes())
            .map_err(|_| ConfigError::InvalidHeader(token.clone()))?;
        let value = HeaderValue::from_str(value.trim())
            .map_err(|_| ConfigError::InvalidHeader(token.clone()))?;

        // A repeated header replaces the earlier one
        headers.insert(name, value);
    }

    Ok(headers)
}

// Parses "key=value" tokens, splitting on the first '='
pub fn parse_params(tokens: &[String]) -> Vec<(String, String)> {
    tokens
        .iter()
        .filter_map(|token| match token.split_once('=') {
            Some((key, value)) => Some((key.trim().to_string(), value.trim().to_string())),
            None => {
                warn!(param = %token, "Ignoring query parameter without '='");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let config = ScanConfig::new("http://example.com/").unwrap();
        assert_eq!(config.base_url, "http://example.com");
        assert_eq!(config.target.host_str(), Some("example.com"));
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.engine.workers, 10);
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(
            ScanConfig::new("not a url"),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_unsupported_scheme() {
        assert!(matches!(
            ScanConfig::new("ftp://example.com"),
            Err(ConfigError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn test_method_is_uppercased() {
        assert_eq!(parse_method("post").unwrap(), Method::POST);
        assert!(parse_method("BAD METHOD").is_err());
    }

    #[test]
    fn test_parse_headers() {
        let headers = parse_headers(&tokens(&["X-Test: 1", "Authorization: Bearer a:b", "broken"])).unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers["x-test"], "1");
        assert_eq!(headers["authorization"], "Bearer a:b");
    }

    #[test]
    fn test_invalid_header_name() {
        let result = parse_headers(&tokens(&["Bad Name: x"]));
        assert!(matches!(result, Err(ConfigError::InvalidHeader(_))));
    }

    #[test]
    fn test_parse_params() {
        let params = parse_params(&tokens(&["q=1", "token = a=b", "flag"]));
        assert_eq!(
            params,
            vec![
                ("q".to_string(), "1".to_string()),
                ("token".to_string(), "a=b".to_string()),
            ]
        );
    }

    #[test]
    fn test_from_cli() {
        let cli = Cli::parse_from([
            "pathscope", "-u", "https://example.com/",
            "-m", "post", "-H", "X-Test: 1", "--params", "a=b",
            "-d", "body", "-t", "4", "-p", "admin", "-v",
        ]);
        let config = ScanConfig::from_cli(&cli).unwrap();
        assert_eq!(config.base_url, "https://example.com");
        assert_eq!(config.request.method, Method::POST);
        assert_eq!(config.request.params.len(), 1);
        assert_eq!(config.request.body.as_deref(), Some("body"));
        assert_eq!(config.engine.workers, 4);
        assert!(config.engine.verbose);
        assert_eq!(config.sources.explicit, vec!["admin"]);
    }

    #[test]
    fn test_zero_threads_rejected() {
        let cli = Cli::parse_from(["pathscope", "-u", "http://example.com", "-t", "0"]);
        assert!(matches!(ScanConfig::from_cli(&cli), Err(ConfigError::NoWorkers)));
    }
}
