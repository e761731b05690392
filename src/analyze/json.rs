// src/analyze/json.rs
// =============================================================================
// This module discovers candidate paths from JSON response bodies.
//
// Only top-level objects are inspected: every string field whose value starts
// with "/" is a candidate path. Anything that isn't valid JSON (most bodies
// aren't) yields an empty set instead of an error.
// =============================================================================

use serde_json::Value;
use std::collections::HashSet;
use tracing::trace;

pub fn extract_json_paths(body: &str) -> HashSet<String> {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => {
            trace!(error = %e, "Body is not JSON");
            return HashSet::new();
        }
    };

    match value {
        Value::Object(fields) => fields
            .into_iter()
            .filter_map(|(_, field)| match field {
                Value::String(s) if s.starts_with('/') => Some(s),
                _ => None,
            })
            .collect(),
        _ => HashSet::new(),
    }
}
