// src/crawl/frontier.rs
// =============================================================================
// This module owns the set of paths still to probe (the frontier).
//
// How it works:
// 1. The frontier is seeded once from the configured path sources
// 2. Every path is normalized to start with "/" and recorded in a seen-set
//    *before* it is queued
// 3. The engine pops paths off the front in batches
// 4. Paths discovered in responses are queued only if never seen before, so
//    no path is ever queued twice, even if ten responses link to it
//
// Rust concepts:
// - VecDeque: FIFO queue (push_back / drain from the front)
// - HashSet: O(1) "have we seen this path?" checks
// =============================================================================

use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Common sensitive paths, used when no other source is configured
pub const DEFAULT_PATHS: &[&str] = &[
    "/",
    "/admin",
    "/wp-admin",
    "/config",
    "/login",
    "/dashboard",
    "/api",
    "/test",
    "/backup",
    "/.env",
    "/phpmyadmin",
    "/.git",
    "/wp-login.php",
    "/administrator",
    "/mysql",
    "/dbadmin",
    "/private",
    "/secure",
    "/internal",
];

/// Where the initial paths come from
#[derive(Debug, Clone, Default)]
pub struct PathSources {
    /// Paths given explicitly (e.g. `-p /admin`)
    pub explicit: Vec<String>,
    /// A file with one path per line
    pub paths_file: Option<PathBuf>,
    /// Include DEFAULT_PATHS. Forced on when neither of the above is set.
    pub use_defaults: bool,
}

impl PathSources {
    /// Collects every configured path, in source order, not yet normalized.
    ///
    /// A path file that can't be read is logged and skipped; the other
    /// sources still apply.
    pub fn load(&self) -> Vec<String> {
        let mut paths = Vec::new();

        let use_defaults =
            self.use_defaults || (self.explicit.is_empty() && self.paths_file.is_none());

        paths.extend(self.explicit.iter().cloned());

        if let Some(file) = &self.paths_file {
            match std::fs::read_to_string(file) {
                Ok(contents) => {
                    let before = paths.len();
                    paths.extend(
                        contents
                            .lines()
                            .map(str::trim)
                            .filter(|line| !line.is_empty())
                            .map(String::from),
                    );
                    debug!(file = %file.display(), count = paths.len() - before, "Loaded paths file");
                }
                Err(e) => {
                    warn!(file = %file.display(), error = %e, "Paths file could not be read, skipping it");
                }
            }
        }

        if use_defaults {
            paths.extend(DEFAULT_PATHS.iter().map(|p| p.to_string()));
        }

        paths
    }
}

/// Trims whitespace and makes sure the path is rooted
pub fn normalize_path(raw: &str) -> String {
    let path = raw.trim();
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

/// Pending queue + seen-set. Owned exclusively by one ScanEngine.
#[derive(Debug, Default)]
pub struct Frontier {
    pending: VecDeque<String>,
    seen: HashSet<String>,
}

impl Frontier {
    /// Builds a frontier from the configured sources
    pub fn seed(sources: &PathSources) -> Self {
        Self::from_paths(sources.load())
    }

    /// Builds a frontier from raw paths: normalized, first occurrence wins
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut frontier = Self::default();
        for path in paths {
            frontier.push(normalize_path(path.as_ref()));
        }
        frontier
    }

    /// Queues a path unless it was seen before.
    ///
    /// Marking and queueing happen in one step, so a path can't be queued
    /// twice. Returns true if the path was new.
    pub fn push(&mut self, path: String) -> bool {
        if !self.seen.insert(path.clone()) {
            return false;
        }
        self.pending.push_back(path);
        true
    }

    /// Removes up to `size` paths from the front of the queue
    pub fn next_batch(&mut self, size: usize) -> Vec<String> {
        let take = size.min(self.pending.len());
        self.pending.drain(..take).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of paths waiting to be probed
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn has_seen(&self, path: &str) -> bool {
        self.seen.contains(path)
    }

    pub fn is_pending(&self, path: &str) -> bool {
        self.pending.iter().any(|p| p == path)
    }

    pub fn seen(&self) -> &HashSet<String> {
        &self.seen
    }

    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("admin"), "/admin");
        assert_eq!(normalize_path("  /login \n"), "/login");
        assert_eq!(normalize_path(""), "/");
    }

    #[test]
    fn test_defaults_used_when_nothing_configured() {
        let paths = PathSources::default().load();
        assert_eq!(paths.len(), DEFAULT_PATHS.len());
        assert!(paths.contains(&"/.env".to_string()));
    }

    #[test]
    fn test_explicit_paths_skip_defaults() {
        let sources = PathSources {
            explicit: vec!["/admin".to_string()],
            ..Default::default()
        };
        assert_eq!(sources.load(), vec!["/admin".to_string()]);
    }

    #[test]
    fn test_defaults_can_be_combined() {
        let sources = PathSources {
            explicit: vec!["/custom".to_string()],
            use_defaults: true,
            ..Default::default()
        };
        let paths = sources.load();
        assert_eq!(paths[0], "/custom");
        assert_eq!(paths.len(), DEFAULT_PATHS.len() + 1);
    }

    #[test]
    fn test_paths_file_is_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "/one\n\n  two  \n/three").unwrap();

        let sources = PathSources {
            paths_file: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        assert_eq!(sources.load(), vec!["/one", "two", "/three"]);
    }

    #[test]
    fn test_missing_paths_file_is_not_fatal() {
        let sources = PathSources {
            explicit: vec!["/admin".to_string()],
            paths_file: Some(PathBuf::from("/definitely/not/here.txt")),
            use_defaults: false,
        };
        assert_eq!(sources.load(), vec!["/admin".to_string()]);
    }

    #[test]
    fn test_missing_paths_file_alone_yields_nothing() {
        // A configured file suppresses the defaults even if it can't be read
        let sources = PathSources {
            paths_file: Some(PathBuf::from("/definitely/not/here.txt")),
            ..Default::default()
        };
        assert!(sources.load().is_empty());
    }

    #[test]
    fn test_seed_deduplicates_after_normalizing() {
        let frontier = Frontier::from_paths(["admin", "/admin", " /admin ", "/login"]);
        assert_eq!(frontier.pending_len(), 2);
        assert_eq!(frontier.pending().collect::<Vec<_>>(), vec!["/admin", "/login"]);
    }

    #[test]
    fn test_seeding_is_idempotent() {
        let sources = PathSources {
            explicit: vec!["/a".to_string(), "b".to_string(), "/a".to_string()],
            use_defaults: true,
            ..Default::default()
        };
        let first = Frontier::seed(&sources);
        let second = Frontier::seed(&sources);
        assert_eq!(first.seen(), second.seen());
    }

    #[test]
    fn test_push_never_requeues_seen_paths() {
        let mut frontier = Frontier::from_paths(["/a"]);
        assert!(!frontier.push("/a".to_string()));

        let batch = frontier.next_batch(10);
        assert_eq!(batch, vec!["/a"]);

        // Already probed, still seen
        assert!(!frontier.push("/a".to_string()));
        assert!(frontier.push("/b".to_string()));
        assert!(!frontier.push("/b".to_string()));
        assert_eq!(frontier.pending_len(), 1);
        assert_eq!(frontier.seen().len(), 2);
    }

    #[test]
    fn test_next_batch_takes_from_front() {
        let mut frontier = Frontier::from_paths((0..5).map(|i| format!("/p{}", i)));
        assert_eq!(frontier.next_batch(2), vec!["/p0", "/p1"]);
        assert_eq!(frontier.next_batch(10), vec!["/p2", "/p3", "/p4"]);
        assert!(frontier.is_empty());
        assert!(frontier.next_batch(10).is_empty());
    }
}
