// src/crawl/mod.rs
// =============================================================================
// This module handles path discovery and the scan loop.
//
// Features:
// - Frontier: pending queue + seen-set, so no path is ever probed twice
// - ScanEngine: batched, bounded-concurrency probing that feeds links found
//   in responses back into the frontier
// - A global scan cap so runaway discovery chains still terminate
// =============================================================================

mod engine;
mod frontier;

pub use engine::{
    format_elapsed, BatchProgress, EngineOptions, EngineState, ScanEngine, ScanResult, ScanSummary,
};
pub use frontier::{Frontier, PathSources};
