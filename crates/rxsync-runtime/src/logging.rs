//! Structured log output for applications embedding the runtime.
//!
//! The runtime only emits `tracing` events; installing a subscriber is the
//! application's call. With the `tracing-json` feature this module offers a
//! ready-made JSON subscriber filtered by `RXSYNC_LOG` (`EnvFilter` syntax,
//! default `info`).

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "RXSYNC_LOG";

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install a global JSON subscriber. Returns `false` if one was already set.
pub fn init_json() -> bool {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter())
        .with_current_span(true)
        .try_init()
        .is_ok()
}
