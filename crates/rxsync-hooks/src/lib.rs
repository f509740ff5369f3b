#![forbid(unsafe_code)]

//! Tear-free hooks binding rxsync streams to components.
//!
//! # Role in rxsync
//! The adapters between `rxsync-stream` sources and the `rxsync-runtime`
//! component model. Every snapshot hook goes through one generic
//! [`bridge::attach`]: the latest signal is kept in a per-component cell and
//! read through the runtime's external-store protocol, so sibling components
//! never commit different values of the same stream.
//!
//! # Hooks
//! - Snapshot reads: [`use_subject`], [`use_behavior_subject`],
//!   [`use_replay_subject`], [`use_async_subject`], [`use_observable`],
//!   [`use_stream_state`].
//! - Callback to stream: [`use_observable_callback`].
//! - Side effects without re-rendering: [`use_subscription`].
//!
//! ```
//! use rxsync_hooks::use_subject;
//! use rxsync_runtime::Runtime;
//! use rxsync_stream::Subject;
//!
//! let clicks = Subject::new();
//! let mut rt = Runtime::default();
//! let source = clicks.clone();
//! let view = rt
//!     .mount((), move |cx, _| use_subject(cx, &source).unwrap_or(0))
//!     .unwrap();
//! rt.act(|| clicks.next(3)).unwrap();
//! assert_eq!(view.output(), Some(3));
//! ```

pub mod bridge;
pub mod callback;
pub mod snapshot;
pub mod subscription;

pub use bridge::{NotifyMask, StreamState};
pub use callback::{Emit, use_observable_callback};
pub use snapshot::{
    use_async_subject, use_behavior_subject, use_observable, use_replay_subject, use_stream_state,
    use_subject,
};
pub use subscription::use_subscription;
