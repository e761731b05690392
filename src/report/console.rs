// src/report/console.rs
// =============================================================================
// This module prints results to the terminal while the scan runs, then saves
// the report files when it ends.
//
// Output goes to stdout; logs go to stderr, so the two never interleave badly
// when stdout is redirected.
// =============================================================================

use anyhow::Result;
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::files::save_results;
use super::ReportSink;
use crate::analyze::Severity;
use crate::cli::OutputFormat;
use crate::crawl::{format_elapsed, BatchProgress, ScanResult, ScanSummary};

// Matches longer than this are cut in the findings table
const MATCH_DISPLAY_WIDTH: usize = 50;

/// Streams results to stdout and writes the report files on finish
pub struct ConsoleReporter {
    format: OutputFormat,
    output_dir: PathBuf,
    /// Unix timestamp of the scan start, used in report file names
    timestamp: i64,
}

impl ConsoleReporter {
    pub fn new(format: OutputFormat, output_dir: PathBuf) -> Self {
        Self {
            format,
            output_dir,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

impl ReportSink for ConsoleReporter {
    fn record(&mut self, result: &ScanResult) {
        print!("{}", render_result(result));
    }

    fn batch_finished(&mut self, progress: &BatchProgress) {
        println!(
            "🔁 Scanned {} path(s). {} path(s) queued for the next batch.\n",
            progress.scanned, progress.pending
        );
    }

    fn finish(&mut self, results: &[ScanResult], summary: &ScanSummary) -> Result<()> {
        print!("{}", render_summary(results, summary));

        let written = save_results(results, self.format, &self.output_dir, self.timestamp)?;
        for path in written {
            println!("💾 Report saved to: {}", path.display());
        }
        Ok(())
    }
}

// Renders one result block: the response line, then its findings, if any
fn render_result(result: &ScanResult) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "{:<2} {:<9} {}\n",
        result.severity.icon(),
        result.severity.to_string().to_uppercase(),
        result.url
    ));
    out.push_str(&format!(
        "   Status: {}   Size: {} bytes   Time: {}\n",
        result.status,
        result.size,
        format_elapsed(&result.elapsed)
    ));

    if !result.findings.is_empty() {
        out.push_str(&format!("\n   {:<24} {:<54} {:<8}\n", "TYPE", "MATCH", "LOCATION"));
        out.push_str(&format!("   {}\n", "-".repeat(88)));
        for finding in &result.findings {
            out.push_str(&format!(
                "   {:<24} {:<54} {:<8}\n",
                finding.category,
                truncate(&finding.matched, MATCH_DISPLAY_WIDTH),
                finding.location
            ));
        }
    }

    out.push_str(&format!("{}\n\n", "=".repeat(80)));
    out
}

fn render_summary(results: &[ScanResult], summary: &ScanSummary) -> String {
    let mut by_severity: BTreeMap<Severity, usize> = BTreeMap::new();
    for result in results {
        *by_severity.entry(result.severity).or_default() += 1;
    }

    let mut out = String::from("📊 Summary:\n");
    for severity in Severity::ALL.iter().rev() {
        out.push_str(&format!(
            "   {:<2} {:<9} {}\n",
            severity.icon(),
            severity.to_string(),
            by_severity.get(severity).copied().unwrap_or(0)
        ));
    }
    out.push_str(&format!("   📋 Scanned:    {}\n", summary.scanned));
    out.push_str(&format!("   ❌ Failed:     {}\n", summary.failed));
    out.push_str(&format!("   🔎 Discovered: {}\n", summary.discovered));
    if summary.capped {
        out.push_str(&format!(
            "   ⚠️  Scan limit reached, {} path(s) left unscanned\n",
            summary.pending
        ));
    }
    out
}

// Cuts on a char boundary so multi-byte matches don't panic
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let cut: String = text.chars().take(width).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}
