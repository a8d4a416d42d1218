//! Log output for the binary.
//!
//! Library code only emits `tracing` events; this installs the subscriber.
//! Logs go to stderr so command output on stdout stays clean.

use std::io;

use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding a filter directive, e.g. `blogsearch=debug`.
pub const LOG_ENV: &str = "BLOGSEARCH_LOG";

/// Level used when `BLOGSEARCH_LOG` is unset.
#[must_use]
pub fn default_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Install the global subscriber. Calling it twice is harmless.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbosity)));

    let _ = fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
