#![forbid(unsafe_code)]

//! Test harness for rxsync hooks.
//!
//! - [`render_hook`] mounts a single hook call inside a throwaway component
//!   and exposes its latest result.
//! - [`SpyStream`] wraps any stream and counts subscribe and release calls.
//! - [`Recorder`] captures reaction invocations for later assertions.
//! - [`init_test_logging`] routes `tracing` output through the test writer.

pub mod recorder;
pub mod render;
pub mod spy;

pub use recorder::Recorder;
pub use render::{RenderHook, render_hook, render_hook_with_config, render_hook_with_props};
pub use spy::SpyStream;

use tracing_subscriber::EnvFilter;

/// Install a test-writer subscriber once per test binary.
///
/// The filter comes from `RXSYNC_LOG` when set, otherwise `info`.
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_env("RXSYNC_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(filter)
        .try_init();
}
