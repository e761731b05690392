// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API: the struct below *is* the CLI. clap generates the
// parser, --help and --version from the fields and their doc comments.
//
// The flags are grouped the same way --help shows them:
// - Path configuration: where the initial paths come from
// - Request configuration: how each probe request is shaped
// - Performance: concurrency, proxy, timeout
// - Output: report format and verbosity
// =============================================================================

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "pathscope",
    version,
    about = "Probe a web host for sensitive paths and classify what they expose",
    long_about = "pathscope requests a set of candidate paths on a target host, scans every \
                  response for sensitive data patterns, and follows links it finds in the \
                  responses to discover more paths to probe.",
    after_help = "Examples:\n  \
                  pathscope -u http://example.com\n  \
                  pathscope -u http://example.com -p /admin -p /login\n  \
                  pathscope -u http://example.com --paths-file paths.txt\n  \
                  pathscope -u http://example.com --default-paths -t 20 --output both"
)]
pub struct Cli {
    /// Target base URL (e.g., http://example.com)
    #[arg(short = 'u', long = "url")]
    pub url: String,

    /// Individual path to test (repeatable)
    #[arg(short = 'p', long = "path", help_heading = "Path Configuration")]
    pub paths: Vec<String>,

    /// File containing newline-separated paths to test
    #[arg(long, help_heading = "Path Configuration")]
    pub paths_file: Option<PathBuf>,

    /// Use the built-in list of common paths
    /// (enabled automatically when no paths are given)
    #[arg(long, help_heading = "Path Configuration")]
    pub default_paths: bool,

    /// HTTP method (GET, POST, etc)
    #[arg(short, long, default_value = "GET", help_heading = "Request Configuration")]
    pub method: String,

    /// Custom header as "Name: Value" (repeatable)
    #[arg(short = 'H', long = "header", help_heading = "Request Configuration")]
    pub headers: Vec<String>,

    /// Request body data
    #[arg(short, long, help_heading = "Request Configuration")]
    pub data: Option<String>,

    /// Query parameter as "key=value" (repeatable)
    #[arg(long = "params", help_heading = "Request Configuration")]
    pub params: Vec<String>,

    /// Number of concurrent requests
    #[arg(short, long, default_value_t = 10, help_heading = "Performance Options")]
    pub threads: usize,

    /// Proxy server (e.g., http://localhost:8080)
    #[arg(short = 'x', long, help_heading = "Performance Options")]
    pub proxy: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 15, help_heading = "Performance Options")]
    pub timeout: u64,

    /// Report file format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json, help_heading = "Output Options")]
    pub output: OutputFormat,

    /// Directory the report files are written to
    #[arg(long, default_value = ".", help_heading = "Output Options")]
    pub output_dir: PathBuf,

    /// Verbose output including failed requests
    #[arg(short, long, help_heading = "Output Options")]
    pub verbose: bool,
}

/// Which report files to write at the end of a scan
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
    Both,
}

impl OutputFormat {
    pub fn wants_json(&self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Both)
    }

    pub fn wants_csv(&self) -> bool {
        matches!(self, OutputFormat::Csv | OutputFormat::Both)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["pathscope", "-u", "http://example.com"]);
        assert_eq!(cli.method, "GET");
        assert_eq!(cli.threads, 10);
        assert_eq!(cli.timeout, 15);
        assert_eq!(cli.output, OutputFormat::Json);
        assert!(cli.paths.is_empty());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_repeatable_flags() {
        let cli = Cli::parse_from([
            "pathscope", "-u", "http://example.com",
            "-p", "/admin", "-p", "/login",
            "-H", "X-Test: 1", "-H", "Cookie: a=b",
            "--params", "q=1",
            "-o", "both",
        ]);
        assert_eq!(cli.paths, vec!["/admin", "/login"]);
        assert_eq!(cli.headers.len(), 2);
        assert_eq!(cli.params, vec!["q=1"]);
        assert!(cli.output.wants_json());
        assert!(cli.output.wants_csv());
    }

    #[test]
    fn test_url_is_required() {
        assert!(Cli::try_parse_from(["pathscope"]).is_err());
    }
}
