// src/logging.rs
// =============================================================================
// Sets up the tracing subscriber.
//
// Log level, first match wins:
// 1. RUST_LOG
// 2. PATHSCOPE_LOGLEVEL
// 3. pathscope=debug with --verbose, pathscope=info otherwise
//
// Logs are written to stderr so stdout only carries scan output.
// =============================================================================

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_ENV: &str = "PATHSCOPE_LOGLEVEL";

/// The filter directive used when no environment variable is set
fn default_directive(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    format!("{}={}", env!("CARGO_CRATE_NAME"), level)
}

fn filter_directive(verbose: bool) -> String {
    std::env::var("RUST_LOG")
        .or_else(|_| std::env::var(LOG_ENV))
        .unwrap_or_else(|_| default_directive(verbose))
}

pub fn init(verbose: bool) {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    // try_init: a second call (e.g. from tests) is not an error worth dying for
    let _ = tracing_subscriber::registry()
        .with(layer)
        .with(EnvFilter::new(filter_directive(verbose)))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false), "pathscope=info");
        assert_eq!(default_directive(true), "pathscope=debug");
    }
}
