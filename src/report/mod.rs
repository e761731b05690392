// src/report/mod.rs
// =============================================================================
// This module is where scan results leave the engine.
//
// Submodules:
// - console: prints each result as it completes, plus a final summary
// - files: writes the JSON / CSV report files
//
// The engine only knows the ReportSink trait, so tests can collect results in
// memory instead of printing them.
// =============================================================================

mod console;
mod files;

pub use console::ConsoleReporter;

use anyhow::Result;

use crate::crawl::{BatchProgress, ScanResult, ScanSummary};

/// Receives results from a running scan
pub trait ReportSink {
    /// Called once per successful probe, as soon as it's classified
    fn record(&mut self, result: &ScanResult);

    /// Called after every batch
    fn batch_finished(&mut self, _progress: &BatchProgress) {}

    /// Called exactly once when the scan stops, with every result in
    /// completion order
    fn finish(&mut self, results: &[ScanResult], summary: &ScanSummary) -> Result<()>;
}
