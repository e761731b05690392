// src/crawl/engine.rs
// =============================================================================
// This module drives the scan: the discovery-and-classification loop.
//
// How it works:
// 1. Pop up to `batch_size` paths off the frontier
// 2. Probe them concurrently, at most `workers` requests in flight
// 3. As each probe completes (in whatever order they finish):
//    - classify headers + body with the PatternMatcher
//    - on HTTP 200, extract links and queue the unseen ones
//    - stream the ScanResult to the report sink
// 4. Repeat until the frontier is empty or more than `scan_cap` probes
//    succeeded, then flush all results to the sink exactly once
//
// States: Idle -> Running -> [Capped ->] Draining -> Done
//
// Paths found in batch N are probed in batch N+1 at the earliest. The batch
// boundary is a barrier: the next batch isn't started until every probe of
// the current one has completed or failed.
//
// Workers only produce outcomes. The frontier and the result list are only
// touched here, between completions, so there is no locking.
// =============================================================================

use anyhow::Result;
use futures::stream::{self, StreamExt};
use serde::{Serialize, Serializer};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::frontier::Frontier;
use crate::analyze::{extract_links, Finding, PatternMatcher, Severity};
use crate::config::ScanConfig;
use crate::error::ConfigError;
use crate::probe::{ProbeError, ProbeOutcome, Prober};
use crate::report::ReportSink;

/// Knobs for the scan loop
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Maximum probes in flight at once
    pub workers: usize,
    /// Maximum paths taken off the frontier per batch
    pub batch_size: usize,
    /// The scan stops after the batch in which this many probes were exceeded
    pub scan_cap: usize,
    /// Log failed probes
    pub verbose: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            workers: 10,
            batch_size: 100,
            scan_cap: 1000,
            verbose: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Running,
    /// Loop exited, flushing results. Reached from Running or Capped.
    Draining,
    /// Scan cap exceeded
    Capped,
    Done,
}

/// The classified result of one successful probe
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    pub path: String,
    pub url: String,
    pub status: u16,
    /// Body size in bytes
    pub size: usize,
    #[serde(rename = "time", serialize_with = "serialize_elapsed")]
    pub elapsed: Duration,
    /// Highest tier across `findings`, Info when there are none
    pub severity: Severity,
    /// Highest tier first; within a tier, header findings before body findings
    pub findings: Vec<Finding>,
}

// Durations go out as "0.42s"
fn serialize_elapsed<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_elapsed(elapsed))
}

pub fn format_elapsed(elapsed: &Duration) -> String {
    format!("{:.2}s", elapsed.as_secs_f64())
}

/// What a finished scan looked like
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Probes that produced a response
    pub scanned: usize,
    /// Probes that failed at the transport level
    pub failed: usize,
    /// Paths found in responses and queued
    pub discovered: usize,
    /// Paths still queued when the scan stopped
    pub pending: usize,
    pub batches: usize,
    /// True if the scan stopped because of the scan cap
    pub capped: bool,
}

/// Progress after one batch, for the report sink
#[derive(Debug, Clone, Copy)]
pub struct BatchProgress {
    pub batch: usize,
    pub scanned: usize,
    pub pending: usize,
}

pub struct ScanEngine {
    prober: Prober,
    matcher: Arc<PatternMatcher>,
    target: Url,
    frontier: Frontier,
    options: EngineOptions,
    state: EngineState,
    history: Vec<EngineState>,
    results: Vec<ScanResult>,
    summary: ScanSummary,
}

impl ScanEngine {
    pub fn new(
        prober: Prober,
        matcher: Arc<PatternMatcher>,
        target: Url,
        frontier: Frontier,
        options: EngineOptions,
    ) -> Self {
        Self {
            prober,
            matcher,
            target,
            frontier,
            options,
            state: EngineState::Idle,
            history: vec![EngineState::Idle],
            results: Vec::new(),
            summary: ScanSummary::default(),
        }
    }

    /// Builds the prober and seeds the frontier from a configuration
    pub fn from_config(config: &ScanConfig, matcher: Arc<PatternMatcher>) -> Result<Self, ConfigError> {
        let prober = Prober::new(
            &config.base_url,
            config.request.clone(),
            config.proxy.as_deref(),
            config.timeout,
        )?;
        let frontier = Frontier::seed(&config.sources);

        Ok(Self::new(
            prober,
            matcher,
            config.target.clone(),
            frontier,
            config.engine.clone(),
        ))
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Every state the engine has been in, oldest first
    pub fn history(&self) -> &[EngineState] {
        &self.history
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// Results accumulated so far, in completion order
    pub fn results(&self) -> &[ScanResult] {
        &self.results
    }

    pub fn summary(&self) -> &ScanSummary {
        &self.summary
    }

    /// Runs the scan to completion and flushes the results to `sink`.
    pub async fn run<S: ReportSink + ?Sized>(&mut self, sink: &mut S) -> Result<ScanSummary> {
        if self.frontier.is_empty() {
            info!("No paths to scan");
        } else {
            info!(
                paths = self.frontier.pending_len(),
                workers = self.options.workers,
                "Starting scan"
            );
        }

        self.set_state(EngineState::Running);

        while !self.frontier.is_empty() {
            self.run_batch(sink).await;

            // Checked per batch, so the cap can be overshot by up to one batch
            if self.summary.scanned > self.options.scan_cap {
                warn!(
                    cap = self.options.scan_cap,
                    scanned = self.summary.scanned,
                    pending = self.frontier.pending_len(),
                    "Scan limit reached, stopping"
                );
                self.summary.capped = true;
                break;
            }
        }

        if self.summary.capped {
            self.set_state(EngineState::Capped);
        }
        self.set_state(EngineState::Draining);

        self.summary.pending = self.frontier.pending_len();
        let flushed = sink.finish(&self.results, &self.summary);
        self.set_state(EngineState::Done);
        flushed?;

        Ok(self.summary.clone())
    }

    /// Probes one batch from the front of the frontier.
    ///
    /// Returns the number of successful probes in the batch.
    pub async fn run_batch<S: ReportSink + ?Sized>(&mut self, sink: &mut S) -> usize {
        // A zero batch size would never drain the frontier
        let batch = self.frontier.next_batch(self.options.batch_size.max(1));
        if batch.is_empty() {
            return 0;
        }

        // Each task gets its own prober handle, like cloning a reqwest Client
        let prober = self.prober.clone();
        let mut outcomes = stream::iter(batch.into_iter().map(|path| {
            let prober = prober.clone();
            async move { prober.probe(path).await }
        }))
        .buffer_unordered(self.options.workers.max(1));

        let mut succeeded = 0;
        while let Some(outcome) = outcomes.next().await {
            match outcome {
                Ok(outcome) => {
                    let result = self.process(outcome);
                    sink.record(&result);
                    self.results.push(result);
                    self.summary.scanned += 1;
                    succeeded += 1;
                }
                Err(e) => self.skip_failed(e),
            }
        }

        self.summary.batches += 1;
        let progress = BatchProgress {
            batch: self.summary.batches,
            scanned: self.summary.scanned,
            pending: self.frontier.pending_len(),
        };
        info!(
            batch = progress.batch,
            scanned = progress.scanned,
            pending = progress.pending,
            "Batch finished"
        );
        sink.batch_finished(&progress);

        succeeded
    }

    // Classifies one response and feeds its links back into the frontier
    fn process(&mut self, outcome: ProbeOutcome) -> ScanResult {
        let text = outcome.text();
        let grouped = self.matcher.scan(&text, &outcome.headers);

        if outcome.status == 200 {
            // Sorted so the queue order doesn't depend on hash order
            let mut links: Vec<String> = extract_links(&text, &self.target).into_iter().collect();
            links.sort();

            for link in links {
                if self.frontier.push(link.clone()) {
                    debug!(from = %outcome.path, path = %link, "Discovered path");
                    self.summary.discovered += 1;
                }
            }
        }

        let severity = Severity::max_of(grouped.keys().copied());
        let findings = grouped
            .into_iter()
            .rev()
            .flat_map(|(_, findings)| findings)
            .collect();

        ScanResult {
            size: outcome.body.len(),
            path: outcome.path,
            url: outcome.url,
            status: outcome.status,
            elapsed: outcome.elapsed,
            severity,
            findings,
        }
    }

    // A failed probe produces no result and is never retried
    fn skip_failed(&mut self, error: ProbeError) {
        self.summary.failed += 1;
        if self.options.verbose {
            warn!(path = %error.path, kind = ?error.kind, error = %error.source, "Request failed");
        }
    }

    fn set_state(&mut self, state: EngineState) {
        debug!(from = ?self.state, to = ?state, "Engine state");
        self.state = state;
        self.history.push(state);
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why buffer_unordered instead of spawning a task per path?
//    - It caps the number of requests in flight at `workers`
//    - Results come back as they complete, so one slow path only holds up its
//      own slot, not the whole batch
//    - The stream lives on this task, so merging results needs no Mutex
//
// 2. Why batches at all?
//    - Links discovered while a batch runs are queued, not probed right away
//    - That keeps memory and concurrency bounded and gives the scan cap a
//      place to be checked
// -----------------------------------------------------------------------------
