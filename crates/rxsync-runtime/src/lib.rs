#![forbid(unsafe_code)]

//! Hook-style component runtime for rxsync.
//!
//! Components are closures rendered by a [`Runtime`]. During render they call
//! hooks on a [`HookCx`]; hook state lives in per-component slots that
//! survive re-renders. External mutable state is read through
//! [`HookCx::use_sync_external_store`], which never lets a committed render
//! observe two different snapshots of one store.
//!
//! # Example
//!
//! ```
//! use rxsync_runtime::Runtime;
//!
//! let mut rt = Runtime::default();
//! let counter = rt
//!     .mount(10, |cx, start: &i32| {
//!         let renders = cx.use_ref(|| 0);
//!         renders.with_mut(|n| *n += 1);
//!         start + renders.get()
//!     })
//!     .unwrap();
//! assert_eq!(counter.output(), Some(11));
//! rt.rerender(counter.id()).unwrap();
//! assert_eq!(counter.output(), Some(12));
//! ```

pub mod config;
pub mod error;
pub mod hook_ref;
pub mod hooks;
#[cfg(feature = "tracing-json")]
pub mod logging;
pub mod runtime;
pub mod scheduler;
pub mod store;

pub use config::{RenderMode, RuntimeConfig};
pub use error::RuntimeError;
pub use hook_ref::HookRef;
pub use hooks::{Cleanup, HookCx};
pub use runtime::{ComponentHandle, Runtime};
pub use scheduler::{ComponentId, RuntimeStats};
pub use store::{ExternalStore, StoreNotifier, Teardown};
