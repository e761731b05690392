// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging and validate the configuration
// 3. Run the scan, streaming results to the terminal
// 4. Exit with proper code (0 = nothing serious, 1 = High/Critical findings,
//    2 = error)
// =============================================================================

mod analyze; // src/analyze/ - pattern matching and link discovery
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - validated scan configuration
mod crawl; // src/crawl/ - frontier and scan engine
mod error; // src/error.rs - typed errors
mod logging; // src/logging.rs - tracing setup
mod probe; // src/probe/ - HTTP requests
mod report; // src/report/ - terminal output and report files

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use analyze::{PatternMatcher, Severity};
use cli::Cli;
use config::ScanConfig;
use crawl::ScanEngine;
use report::ConsoleReporter;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = scan finished, nothing rated High or Critical
//   Ok(1) = at least one High or Critical result
//   Err   = bad configuration or the reports couldn't be written
async fn run() -> Result<i32> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = ScanConfig::from_cli(&cli)?;

    // Compiled once, shared read-only by the whole scan
    let matcher = PatternMatcher::builtin().context("Failed to compile the pattern table")?;
    debug!(patterns = matcher.len(), "Pattern table compiled");

    let mut engine = ScanEngine::from_config(&config, Arc::new(matcher))?;

    println!("🔍 Scanning: {}", config.base_url);
    println!(
        "📄 {} initial path(s), {} concurrent request(s)\n",
        engine.frontier().pending_len(),
        config.engine.workers
    );

    let mut reporter = ConsoleReporter::new(config.output, config.output_dir.clone());
    let summary = engine.run(&mut reporter).await?;
    debug!(states = ?engine.history(), ?summary, "Scan finished");

    let serious = engine
        .results()
        .iter()
        .filter(|r| r.severity >= Severity::High)
        .count();

    Ok(if serious > 0 { 1 } else { 0 })
}
