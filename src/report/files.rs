// src/report/files.rs
// =============================================================================
// This module writes the report files at the end of a scan.
//
// - JSON: a pretty-printed array with one record per probed path
// - CSV: one row per finding; a path without findings still gets one row
//   with the finding columns left empty
//
// File names carry the scan's Unix timestamp:
//   pathscope_report_1700000000.json / .csv
// =============================================================================

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::cli::OutputFormat;
use crate::crawl::{format_elapsed, ScanResult};

const CSV_HEADER: [&str; 8] = [
    "URL",
    "Status",
    "Size",
    "Time",
    "Severity",
    "Finding Type",
    "Match",
    "Location",
];

/// Where a report with the given extension is written
pub fn report_path(dir: &Path, timestamp: i64, extension: &str) -> PathBuf {
    dir.join(format!("pathscope_report_{}.{}", timestamp, extension))
}

/// Writes the report files selected by `format`.
///
/// Returns the paths written; empty when there was nothing to save.
pub fn save_results(
    results: &[ScanResult],
    format: OutputFormat,
    dir: &Path,
    timestamp: i64,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    if results.is_empty() {
        info!("No results to save");
        return Ok(written);
    }

    if format.wants_json() {
        let path = report_path(dir, timestamp, "json");
        let file = File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        write_json(results, BufWriter::new(file))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(file = %path.display(), "JSON report saved");
        written.push(path);
    }

    if format.wants_csv() {
        let path = report_path(dir, timestamp, "csv");
        let file = File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        write_csv(results, file).with_context(|| format!("Failed to write {}", path.display()))?;
        info!(file = %path.display(), "CSV report saved");
        written.push(path);
    }

    Ok(written)
}

pub fn write_json<W: Write>(results: &[ScanResult], mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, results)?;
    writer.flush()?;
    Ok(())
}

pub fn write_csv<W: Write>(results: &[ScanResult], writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(CSV_HEADER)?;

    for result in results {
        let status = result.status.to_string();
        let size = result.size.to_string();
        let time = format_elapsed(&result.elapsed);
        let severity = result.severity.to_string();

        if result.findings.is_empty() {
            csv.write_record([
                result.url.as_str(),
                status.as_str(),
                size.as_str(),
                time.as_str(),
                severity.as_str(),
                "",
                "",
                "",
            ])?;
            continue;
        }

        for finding in &result.findings {
            let location = finding.location.to_string();
            csv.write_record([
                result.url.as_str(),
                status.as_str(),
                size.as_str(),
                time.as_str(),
                severity.as_str(),
                finding.category.as_str(),
                finding.matched.as_str(),
                location.as_str(),
            ])?;
        }
    }

    csv.flush()?;
    Ok(())
}
