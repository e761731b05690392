// src/probe/mod.rs
// =============================================================================
// This module talks to the target host.
//
// Submodules:
// - http: the Prober (one request per path) and its outcome/error types
// =============================================================================

mod http;

pub use http::{ProbeError, ProbeOutcome, Prober, RequestSpec, TransportKind, DEFAULT_TIMEOUT};
